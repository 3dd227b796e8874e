//! Rendering of [`Predicate`]s into SQL.

use std::fmt::Write as _;

use postgres_types::{FromSql, ToSql};

use crate::read::property::list::{Column, Predicate, Value};

/// Pattern of the `ILIKE` operator matching any text containing the input.
#[derive(Clone, Debug, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct LikePattern(String);

impl LikePattern {
    /// Creates a new [`LikePattern`] matching any text containing the
    /// provided `input` literally.
    #[must_use]
    pub fn contains(input: &str) -> Self {
        let mut pattern = String::with_capacity(input.len() + 2);
        pattern.push('%');
        for c in input.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        Self(pattern)
    }
}

/// Boxed SQL query parameter.
pub type Param = Box<dyn ToSql + Send + Sync>;

/// SQL condition rendered out of a [`Predicate`].
#[derive(Debug)]
pub struct Sql {
    /// Text of the condition, suitable to be put into a `WHERE` clause.
    pub condition: String,

    /// Parameters referenced by the [`Sql::condition`].
    pub params: Vec<Param>,
}

impl Sql {
    /// Renders the provided [`Predicate`], numbering its parameters starting
    /// right after the `preceding` ones.
    ///
    /// Absent [`Predicate`] renders as an always true condition.
    #[must_use]
    pub fn render(predicate: Option<&Predicate>, preceding: usize) -> Self {
        let mut sql = Self {
            condition: String::new(),
            params: Vec::new(),
        };
        match predicate {
            Some(p) => sql.push(p, preceding),
            None => sql.condition.push_str("true"),
        }
        sql
    }

    /// Returns references to the [`Sql::params`] to be passed along with the
    /// [`Sql::condition`].
    #[must_use]
    pub fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| -> &(dyn ToSql + Sync) { &**p })
            .collect()
    }

    /// Appends the provided [`Predicate`] to the [`Sql::condition`].
    fn push(&mut self, predicate: &Predicate, preceding: usize) {
        match predicate {
            Predicate::Contains(col, needle) => {
                let idx = self.bind(LikePattern::contains(needle), preceding);
                self.write(format_args!(
                    "{} ILIKE ${idx}::VARCHAR",
                    column(*col),
                ));
            }
            Predicate::Equals(col, value) => {
                let (idx, ty) = match value {
                    Value::Text(s) => {
                        (self.bind(s.clone(), preceding), "VARCHAR")
                    }
                    Value::Number(n) => (self.bind(*n, preceding), "INT8"),
                    Value::Flag(f) => (self.bind(*f, preceding), "BOOL"),
                };
                self.write(format_args!("{} = ${idx}::{ty}", column(*col)));
            }
            Predicate::AtLeast(col, n) => {
                let idx = self.bind(*n, preceding);
                let col = column(*col);
                self.write(format_args!(
                    "({col} >= ${idx}::INT8 AND {col} IS NOT NULL)",
                ));
            }
            Predicate::AtMost(col, n) => {
                let idx = self.bind(*n, preceding);
                self.write(format_args!("{} <= ${idx}::INT8", column(*col)));
            }
            Predicate::Any(ps) => self.push_all(ps, " OR ", "false", preceding),
            Predicate::All(ps) => self.push_all(ps, " AND ", "true", preceding),
        }
    }

    /// Appends the provided [`Predicate`]s joined with the `separator`, or the
    /// `empty` condition if there are none.
    fn push_all(
        &mut self,
        predicates: &[Predicate],
        separator: &str,
        empty: &str,
        preceding: usize,
    ) {
        if predicates.is_empty() {
            self.condition.push_str(empty);
            return;
        }
        self.condition.push('(');
        for (i, p) in predicates.iter().enumerate() {
            if i > 0 {
                self.condition.push_str(separator);
            }
            self.push(p, preceding);
        }
        self.condition.push(')');
    }

    /// Adds the provided parameter, returning its placeholder index.
    fn bind(
        &mut self,
        param: impl ToSql + Send + Sync + 'static,
        preceding: usize,
    ) -> usize {
        self.params.push(Box::new(param));
        preceding + self.params.len()
    }

    /// Appends the formatted text to the [`Sql::condition`].
    fn write(&mut self, args: std::fmt::Arguments<'_>) {
        // Writing into a `String` never fails.
        _ = self.condition.write_fmt(args);
    }
}

/// Returns the name of the `properties` table column storing the [`Column`].
fn column(col: Column) -> &'static str {
    match col {
        Column::StreetName => "street_name",
        Column::StreetNumber => "street_number",
        Column::ComplexName => "complex_name",
        Column::ComplexNumber => "complex_number",
        Column::Area => "area",
        Column::Price => "price",
        Column::Bedrooms => "bedrooms",
        Column::Bathrooms => "bathrooms",
        Column::Garages => "garages",
        Column::Carports => "carports",
        Column::SwimmingPool => "swimming_pool",
        Column::GardenFlat => "garden_flat",
        Column::Study => "study",
        Column::GroundFloor => "ground_floor",
        Column::PetFriendly => "pet_friendly",
        Column::Kind => "prop_type",
        Column::Category => "prop_category",
        Column::Agent => "agent",
    }
}

#[cfg(test)]
mod spec {
    use crate::read::property::list::{Column, Filter, Predicate, Value};

    use super::{LikePattern, Sql};

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(LikePattern::contains("sand"), LikePattern("%sand%".into()));
        assert_eq!(
            LikePattern::contains("50%_off\\"),
            LikePattern("%50\\%\\_off\\\\%".into()),
        );
    }

    #[test]
    fn absent_predicate_is_always_true() {
        let sql = Sql::render(None, 2);

        assert_eq!(sql.condition, "true");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn numbers_parameters_after_preceding_ones() {
        let predicate = Predicate::All(vec![
            Predicate::Any(vec![
                Predicate::Contains(Column::Area, "Sandton".into()),
                Predicate::Contains(Column::Area, "Rosebank".into()),
            ]),
            Predicate::AtLeast(Column::Price, 100),
            Predicate::AtMost(Column::Price, 900),
            Predicate::Equals(Column::Bedrooms, Value::Number(2)),
            Predicate::Equals(Column::Study, Value::Flag(true)),
            Predicate::Equals(Column::Kind, Value::Text("House".into())),
        ]);

        let sql = Sql::render(Some(&predicate), 2);

        assert_eq!(
            sql.condition,
            "((area ILIKE $3::VARCHAR OR area ILIKE $4::VARCHAR) \
             AND (price >= $5::INT8 AND price IS NOT NULL) \
             AND price <= $6::INT8 \
             AND bedrooms = $7::INT8 \
             AND study = $8::BOOL \
             AND prop_type = $9::VARCHAR)",
        );
        assert_eq!(sql.params.len(), 7);
        assert_eq!(sql.params().len(), 7);
        assert_eq!(
            format!("{:?}", sql.params),
            r#"[LikePattern("%Sandton%"), LikePattern("%Rosebank%"), 100, 900, 2, true, "House"]"#,
        );
    }

    #[test]
    fn empty_compositions_render_neutral_conditions() {
        assert_eq!(
            Sql::render(Some(&Predicate::Any(vec![])), 0).condition,
            "false",
        );
        assert_eq!(
            Sql::render(Some(&Predicate::All(vec![])), 0).condition,
            "true",
        );
    }

    #[test]
    fn renders_filter_predicates() {
        let filter = Filter {
            complex_name: Some("Oak".into()),
            ..Filter::default()
        };

        let sql = Sql::render(filter.predicate().as_ref(), 0);

        assert_eq!(
            sql.condition,
            "(complex_name ILIKE $1::VARCHAR OR street_name ILIKE $2::VARCHAR)",
        );
    }
}
