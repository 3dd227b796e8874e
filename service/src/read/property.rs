//! [`Property`] read model definitions.
//!
//! [`Property`]: crate::domain::Property

use derive_more::{From, Into};

use crate::domain::property;

/// Distinct [`property::Area`]s of all the listed [`Property`]s.
///
/// [`Property`]: crate::domain::Property
#[derive(Clone, Debug, Default, Eq, From, Into, PartialEq)]
pub struct Areas(pub Vec<property::Area>);

pub mod list {
    //! [`Property`]s list definitions.

    use common::pagination;
    use derive_more::{Display, Error};
    use rust_decimal::Decimal;

    use crate::domain::{property, Property};

    /// Page of the [`Property`]s list.
    pub type Page = pagination::Page<Property>;

    /// Validated request for a [`Page`] of [`Property`]s.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub struct Selector {
        /// [`pagination::Arguments`] of the requested [`Page`].
        arguments: pagination::Arguments,

        /// [`Filter`] narrowing the listed [`Property`]s.
        filter: Filter,
    }

    impl Selector {
        /// Creates a new [`Selector`] out of the provided [`Filter`].
        ///
        /// # Errors
        ///
        /// If the [`Filter`] is not [valid](Filter::validate), so no query is
        /// ever built out of it.
        pub fn new(
            arguments: pagination::Arguments,
            filter: Filter,
        ) -> Result<Self, FilterError> {
            filter.validate()?;
            Ok(Self { arguments, filter })
        }

        /// Returns [`pagination::Arguments`] of this [`Selector`].
        #[must_use]
        pub fn arguments(&self) -> pagination::Arguments {
            self.arguments
        }

        /// Returns the [`Filter`] of this [`Selector`].
        #[must_use]
        pub fn filter(&self) -> &Filter {
            &self.filter
        }
    }

    /// Criteria narrowing a list of [`Property`]s.
    ///
    /// Absent fields do not narrow anything.
    #[derive(Clone, Debug, Default, Eq, PartialEq)]
    pub struct Filter {
        /// Areas any of which should be contained in the [`property::Area`].
        pub areas: Vec<String>,

        /// Inclusive lower bound of the [`property::Price`].
        pub min_price: Option<i64>,

        /// Inclusive upper bound of the [`property::Price`].
        pub max_price: Option<i64>,

        /// Part of the [`property::StreetName`].
        pub street_name: Option<String>,

        /// Part of the [`property::ComplexName`] or the
        /// [`property::StreetName`].
        pub complex_name: Option<String>,

        /// Exact [`property::StreetNumber`] or [`property::ComplexNumber`].
        pub number: Option<String>,

        /// [`Count`] of bedrooms.
        pub bedrooms: Option<Count>,

        /// [`Count`] of bathrooms.
        pub bathrooms: Option<Count>,

        /// [`Count`] of garages.
        pub garages: Option<Count>,

        /// [`Count`] of carports.
        pub carports: Option<Count>,

        /// Requires [`property::Amenities::swimming_pool`].
        pub swimming_pool: bool,

        /// Requires [`property::Amenities::garden_flat`].
        pub garden_flat: bool,

        /// Requires [`property::Amenities::study`].
        pub study: bool,

        /// Requires [`property::Amenities::ground_floor`].
        pub ground_floor: bool,

        /// Requires [`property::Amenities::pet_friendly`].
        pub pet_friendly: bool,

        /// Exact [`property::Kind`].
        pub kind: Option<String>,

        /// Exact [`property::Category`].
        pub category: Option<String>,

        /// Part of the [`property::Agent`] name.
        pub agent: Option<String>,
    }

    impl Filter {
        /// Value of [`Filter::kind`] and [`Filter::category`] selecting
        /// everything.
        pub const ANY: &'static str = "Any";

        /// Builds a [`Filter`] out of the raw request `params`.
        ///
        /// Unknown keys and blank values are ignored. If a key repeats, its
        /// last non-blank value is used, except `area_filter` whose values
        /// are all accumulated.
        #[must_use]
        pub fn from_params<K, V>(
            params: impl IntoIterator<Item = (K, V)>,
        ) -> Self
        where
            K: AsRef<str>,
            V: AsRef<str>,
        {
            let mut filter = Self::default();
            for (key, value) in params {
                let value = value.as_ref().trim();
                if value.is_empty() {
                    continue;
                }
                let text = || Some(value.to_owned());

                match key.as_ref() {
                    "area_filter" => {
                        for area in value.split(',').map(str::trim) {
                            if !area.is_empty()
                                && !filter.areas.iter().any(|a| a == area)
                            {
                                filter.areas.push(area.to_owned());
                            }
                        }
                    }
                    "min_price_filter" => filter.min_price = price(value),
                    "max_price_filter" => filter.max_price = price(value),
                    "street_name_filter" => filter.street_name = text(),
                    "complex_name_filter" => filter.complex_name = text(),
                    "number_filter" => filter.number = text(),
                    "bedroom_filter" => filter.bedrooms = Count::parse(value),
                    "bathroom_filter" => filter.bathrooms = Count::parse(value),
                    "garages_filter" => filter.garages = Count::parse(value),
                    "carports_filter" => filter.carports = Count::parse(value),
                    "swimming_pool_filter" => filter.swimming_pool = true,
                    "garden_flat_filter" => filter.garden_flat = true,
                    "study_filter" => filter.study = true,
                    "ground_floor_filter" => filter.ground_floor = true,
                    "pet_friendly_filter" => filter.pet_friendly = true,
                    "prop_type_filter" => filter.kind = text(),
                    "prop_category_filter" => filter.category = text(),
                    "agent_filter" => filter.agent = text(),
                    _ => {}
                }
            }
            filter
        }

        /// Checks this [`Filter`] for contradicting criteria.
        ///
        /// # Errors
        ///
        /// With [`FilterError::PriceRange`] if the minimum price exceeds the
        /// maximum one.
        pub fn validate(&self) -> Result<(), FilterError> {
            match (self.min_price, self.max_price) {
                (Some(min), Some(max)) if min > max => {
                    Err(FilterError::PriceRange { min, max })
                }
                _ => Ok(()),
            }
        }

        /// Composes a single [`Predicate`] out of this [`Filter`].
        ///
        /// [`None`] is returned if nothing should be narrowed.
        #[must_use]
        pub fn predicate(&self) -> Option<Predicate> {
            use Column as C;

            let text = |s: &str| Value::Text(s.to_owned());
            let flags = [
                (self.swimming_pool, C::SwimmingPool),
                (self.garden_flat, C::GardenFlat),
                (self.study, C::Study),
                (self.ground_floor, C::GroundFloor),
                (self.pet_friendly, C::PetFriendly),
            ];
            let counts = [
                (self.bedrooms, C::Bedrooms),
                (self.bathrooms, C::Bathrooms),
                (self.garages, C::Garages),
                (self.carports, C::Carports),
            ];

            let mut clauses = Vec::new();
            if !self.areas.is_empty() {
                clauses.push(Predicate::Any(
                    self.areas
                        .iter()
                        .map(|a| Predicate::Contains(C::Area, a.clone()))
                        .collect(),
                ));
            }
            if let Some(min) = self.min_price {
                clauses.push(Predicate::AtLeast(C::Price, min));
            }
            if let Some(max) = self.max_price {
                clauses.push(Predicate::AtMost(C::Price, max));
            }
            if let Some(street) = &self.street_name {
                clauses.push(Predicate::Contains(C::StreetName, street.clone()));
            }
            if let Some(complex) = &self.complex_name {
                clauses.push(Predicate::Any(vec![
                    Predicate::Contains(C::ComplexName, complex.clone()),
                    Predicate::Contains(C::StreetName, complex.clone()),
                ]));
            }
            if let Some(number) = &self.number {
                clauses.push(Predicate::Any(vec![
                    Predicate::Equals(C::StreetNumber, text(number)),
                    Predicate::Equals(C::ComplexNumber, text(number)),
                ]));
            }
            clauses.extend(
                counts
                    .into_iter()
                    .filter_map(|(count, col)| Some(count?.predicate(col))),
            );
            clauses.extend(flags.into_iter().filter(|(on, _)| *on).map(
                |(_, col)| Predicate::Equals(col, Value::Flag(true)),
            ));
            for (value, col) in [
                (&self.kind, C::Kind),
                (&self.category, C::Category),
            ] {
                if let Some(v) = value.as_deref().filter(|v| *v != Self::ANY) {
                    clauses.push(Predicate::Equals(col, text(v)));
                }
            }
            if let Some(agent) = &self.agent {
                clauses.push(Predicate::Contains(C::Agent, agent.clone()));
            }

            match clauses.len() {
                0 => None,
                1 => clauses.pop(),
                _ => Some(Predicate::All(clauses)),
            }
        }
    }

    /// Parses a price bound out of a formatted number.
    fn price(input: &str) -> Option<i64> {
        property::Price::parse_formatted(input).map(Into::into)
    }

    /// Error of an invalid [`Filter`].
    #[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
    pub enum FilterError {
        /// Minimum price exceeds the maximum one.
        #[display("Minimum price {min} exceeds maximum price {max}")]
        PriceRange {
            /// Requested minimum price.
            min: i64,

            /// Requested maximum price.
            max: i64,
        },
    }

    /// Count criterion of a [`Filter`], like `2` or `3+`.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum Count {
        /// Exactly the specified number.
        Exactly(i64),

        /// The specified number or more.
        AtLeast(i64),
    }

    impl Count {
        /// Parses one of the `1`, `2`, `2+`, `3`, `3+`, `4+` tokens.
        ///
        /// [`None`] is returned for any other token.
        #[must_use]
        pub fn parse(token: &str) -> Option<Self> {
            Some(match token {
                "1" => Self::Exactly(1),
                "2" => Self::Exactly(2),
                "3" => Self::Exactly(3),
                "2+" => Self::AtLeast(2),
                "3+" => Self::AtLeast(3),
                "4+" => Self::AtLeast(4),
                _ => return None,
            })
        }

        /// Returns the [`Predicate`] applying this [`Count`] to the `column`.
        #[must_use]
        pub fn predicate(self, column: Column) -> Predicate {
            match self {
                Self::Exactly(n) => Predicate::Equals(column, Value::Number(n)),
                Self::AtLeast(n) => Predicate::AtLeast(column, n),
            }
        }
    }

    /// Condition upon a single [`Property`].
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub enum Predicate {
        /// [`Column`] contains the text, ignoring case.
        Contains(Column, String),

        /// [`Column`] equals the [`Value`].
        Equals(Column, Value),

        /// [`Column`] is present and not less than the number.
        AtLeast(Column, i64),

        /// [`Column`] is present and not greater than the number.
        AtMost(Column, i64),

        /// At least one of the [`Predicate`]s holds.
        Any(Vec<Predicate>),

        /// All the [`Predicate`]s hold.
        All(Vec<Predicate>),
    }

    impl Predicate {
        /// Evaluates this [`Predicate`] upon the provided [`Property`].
        ///
        /// Absent values never satisfy a comparison.
        #[must_use]
        pub fn matches(&self, property: &Property) -> bool {
            match self {
                Self::Contains(col, needle) => col
                    .text(property)
                    .is_some_and(|s| {
                        s.to_lowercase().contains(&needle.to_lowercase())
                    }),
                Self::Equals(col, Value::Text(v)) => {
                    col.text(property) == Some(v.as_str())
                }
                Self::Equals(col, Value::Number(n)) => {
                    col.number(property) == Some(Decimal::from(*n))
                }
                Self::Equals(col, Value::Flag(f)) => {
                    col.flag(property) == Some(*f)
                }
                Self::AtLeast(col, n) => {
                    col.number(property).is_some_and(|v| v >= Decimal::from(*n))
                }
                Self::AtMost(col, n) => {
                    col.number(property).is_some_and(|v| v <= Decimal::from(*n))
                }
                Self::Any(ps) => ps.iter().any(|p| p.matches(property)),
                Self::All(ps) => ps.iter().all(|p| p.matches(property)),
            }
        }
    }

    /// Value compared by a [`Predicate::Equals`].
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub enum Value {
        /// Text value.
        Text(String),

        /// Numeric value.
        Number(i64),

        /// Boolean value.
        Flag(bool),
    }

    /// Filterable attribute of a [`Property`].
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub enum Column {
        /// [`property::Listing::street_name`].
        StreetName,

        /// [`property::Listing::street_number`].
        StreetNumber,

        /// [`property::Listing::complex_name`].
        ComplexName,

        /// [`property::Listing::complex_number`].
        ComplexNumber,

        /// [`property::Listing::area`].
        Area,

        /// [`property::Listing::price`].
        Price,

        /// [`property::Listing::bedrooms`].
        Bedrooms,

        /// [`property::Listing::bathrooms`].
        Bathrooms,

        /// [`property::Listing::garages`].
        Garages,

        /// [`property::Listing::carports`].
        Carports,

        /// [`property::Amenities::swimming_pool`].
        SwimmingPool,

        /// [`property::Amenities::garden_flat`].
        GardenFlat,

        /// [`property::Amenities::study`].
        Study,

        /// [`property::Amenities::ground_floor`].
        GroundFloor,

        /// [`property::Amenities::pet_friendly`].
        PetFriendly,

        /// [`property::Listing::kind`].
        Kind,

        /// [`property::Listing::category`].
        Category,

        /// [`property::Listing::agent`].
        Agent,
    }

    impl Column {
        /// Returns the textual value of this [`Column`] in the [`Property`].
        fn text(self, property: &Property) -> Option<&str> {
            let l = &property.listing;
            match self {
                Self::StreetName => l.street_name.as_ref().map(AsRef::as_ref),
                Self::StreetNumber => {
                    l.street_number.as_ref().map(AsRef::as_ref)
                }
                Self::ComplexName => l.complex_name.as_ref().map(AsRef::as_ref),
                Self::ComplexNumber => {
                    l.complex_number.as_ref().map(AsRef::as_ref)
                }
                Self::Area => l.area.as_ref().map(AsRef::as_ref),
                Self::Kind => l.kind.as_ref().map(AsRef::as_ref),
                Self::Category => l.category.as_ref().map(AsRef::as_ref),
                Self::Agent => l.agent.as_ref().map(AsRef::as_ref),
                Self::Price
                | Self::Bedrooms
                | Self::Bathrooms
                | Self::Garages
                | Self::Carports
                | Self::SwimmingPool
                | Self::GardenFlat
                | Self::Study
                | Self::GroundFloor
                | Self::PetFriendly => None,
            }
        }

        /// Returns the numeric value of this [`Column`] in the [`Property`].
        fn number(self, property: &Property) -> Option<Decimal> {
            let l = &property.listing;
            let rooms = |r: Option<property::Rooms>| {
                r.map(|r| Decimal::from(i32::from(r)))
            };
            match self {
                Self::Price => l.price.map(|p| Decimal::from(i64::from(p))),
                Self::Bedrooms => rooms(l.bedrooms),
                Self::Bathrooms => l.bathrooms.map(Decimal::from),
                Self::Garages => rooms(l.garages),
                Self::Carports => rooms(l.carports),
                Self::StreetName
                | Self::StreetNumber
                | Self::ComplexName
                | Self::ComplexNumber
                | Self::Area
                | Self::SwimmingPool
                | Self::GardenFlat
                | Self::Study
                | Self::GroundFloor
                | Self::PetFriendly
                | Self::Kind
                | Self::Category
                | Self::Agent => None,
            }
        }

        /// Returns the boolean value of this [`Column`] in the [`Property`].
        fn flag(self, property: &Property) -> Option<bool> {
            let a = property.listing.amenities;
            match self {
                Self::SwimmingPool => Some(a.swimming_pool),
                Self::GardenFlat => Some(a.garden_flat),
                Self::Study => Some(a.study),
                Self::GroundFloor => Some(a.ground_floor),
                Self::PetFriendly => Some(a.pet_friendly),
                Self::StreetName
                | Self::StreetNumber
                | Self::ComplexName
                | Self::ComplexNumber
                | Self::Area
                | Self::Price
                | Self::Bedrooms
                | Self::Bathrooms
                | Self::Garages
                | Self::Carports
                | Self::Kind
                | Self::Category
                | Self::Agent => None,
            }
        }
    }

    #[cfg(test)]
    mod spec {
        use common::pagination;

        use crate::domain::{property, Property};

        use super::{
            Column, Count, Filter, FilterError, Predicate, Selector, Value,
        };

        fn property(id: i32, f: impl FnOnce(&mut property::Listing)) -> Property {
            let mut listing = property::Listing::default();
            f(&mut listing);
            Property {
                id: id.into(),
                listing,
            }
        }

        fn matching(filter: &Filter, rows: &[Property]) -> Vec<i32> {
            rows.iter()
                .filter(|p| {
                    filter.predicate().map_or(true, |pr| pr.matches(p))
                })
                .map(|p| p.id.into())
                .collect()
        }

        #[test]
        fn empty_filter_is_identity() {
            assert_eq!(Filter::default().predicate(), None);

            let blank = Filter::from_params([
                ("area_filter", ""),
                ("min_price_filter", "  "),
                ("bedroom_filter", ""),
                ("swimming_pool_filter", ""),
                ("unknown", "value"),
            ]);
            assert_eq!(blank, Filter::default());
            assert_eq!(blank.predicate(), None);
        }

        #[test]
        fn parses_count_tokens() {
            assert_eq!(Count::parse("1"), Some(Count::Exactly(1)));
            assert_eq!(Count::parse("2"), Some(Count::Exactly(2)));
            assert_eq!(Count::parse("2+"), Some(Count::AtLeast(2)));
            assert_eq!(Count::parse("3"), Some(Count::Exactly(3)));
            assert_eq!(Count::parse("3+"), Some(Count::AtLeast(3)));
            assert_eq!(Count::parse("4+"), Some(Count::AtLeast(4)));
            for token in ["0", "4", "5+", "1+", "two", "+2", ""] {
                assert_eq!(Count::parse(token), None, "token: {token:?}");
            }
        }

        #[test]
        fn exact_count_compares_the_passed_column() {
            assert_eq!(
                Count::parse("1").unwrap().predicate(Column::Garages),
                Predicate::Equals(Column::Garages, Value::Number(1)),
            );
        }

        #[test]
        fn unknown_count_token_produces_no_clause() {
            let filter = Filter::from_params([("bedroom_filter", "7")]);

            assert_eq!(filter.bedrooms, None);
            assert_eq!(filter.predicate(), None);
        }

        #[test]
        fn at_least_count_excludes_absent_values() {
            let rows = [
                property(1, |l| l.bedrooms = None),
                property(2, |l| l.bedrooms = property::Rooms::new(1)),
                property(3, |l| l.bedrooms = property::Rooms::new(2)),
                property(4, |l| l.bedrooms = property::Rooms::new(5)),
            ];
            let filter = Filter::from_params([("bedroom_filter", "2+")]);

            assert_eq!(matching(&filter, &rows), [3, 4]);
        }

        #[test]
        fn areas_are_or_ed_case_insensitively() {
            let area = |a: &str| property::Area::new(a);
            let rows = [
                property(1, |l| l.area = area("Sandton Central")),
                property(2, |l| l.area = area("ROSEBANK")),
                property(3, |l| l.area = area("Fourways")),
                property(4, |l| l.area = None),
            ];
            let filter =
                Filter::from_params([("area_filter", "Sandton, Rosebank")]);

            assert_eq!(filter.areas, ["Sandton", "Rosebank"]);
            assert_eq!(matching(&filter, &rows), [1, 2]);
        }

        #[test]
        fn repeated_areas_are_accumulated() {
            let rows = [
                property(1, |l| l.area = property::Area::new("Sandton")),
                property(2, |l| l.area = property::Area::new("Rosebank")),
                property(3, |l| l.area = property::Area::new("Fourways")),
            ];
            let filter = Filter::from_params([
                ("area_filter", "Sandton"),
                ("area_filter", "Rosebank, Sandton"),
                ("area_filter", ""),
            ]);

            assert_eq!(filter.areas, ["Sandton", "Rosebank"]);
            assert_eq!(matching(&filter, &rows), [1, 2]);
        }

        #[test]
        fn areas_are_and_ed_with_other_clauses() {
            let rows = [
                property(1, |l| {
                    l.area = property::Area::new("Sandton");
                    l.amenities.swimming_pool = true;
                }),
                property(2, |l| l.area = property::Area::new("Sandton")),
            ];
            let filter = Filter::from_params([
                ("area_filter", "sandton"),
                ("swimming_pool_filter", "on"),
            ]);

            assert_eq!(matching(&filter, &rows), [1]);
        }

        #[test]
        fn number_matches_street_or_complex_number() {
            let rows = [
                property(1, |l| {
                    l.street_number = property::StreetNumber::new("12");
                }),
                property(2, |l| {
                    l.complex_number = property::ComplexNumber::new("12");
                }),
                property(3, |l| {
                    l.street_number = property::StreetNumber::new("7");
                    l.complex_number = property::ComplexNumber::new("120");
                }),
            ];
            let filter = Filter::from_params([("number_filter", "12")]);
            assert_eq!(matching(&filter, &rows), [1, 2]);

            let Some(Predicate::All(clauses)) = Filter::from_params([
                ("number_filter", "12"),
                ("street_name_filter", "Main"),
                ("complex_name_filter", "Palms"),
            ])
            .predicate() else {
                panic!("expected a conjunction");
            };
            assert!(clauses.contains(&Predicate::Any(vec![
                Predicate::Equals(Column::StreetNumber, Value::Text("12".into())),
                Predicate::Equals(
                    Column::ComplexNumber,
                    Value::Text("12".into()),
                ),
            ])));
        }

        #[test]
        fn complex_name_also_matches_street_name() {
            let rows = [
                property(1, |l| {
                    l.complex_name = property::ComplexName::new("The Palms");
                }),
                property(2, |l| {
                    l.street_name = property::StreetName::new("Palm Street");
                }),
                property(3, |l| {
                    l.street_name = property::StreetName::new("Oak Avenue");
                }),
            ];
            let filter = Filter::from_params([("complex_name_filter", "palm")]);

            assert_eq!(matching(&filter, &rows), [1, 2]);
        }

        #[test]
        fn any_kind_and_category_are_skipped() {
            let filter = Filter::from_params([
                ("prop_type_filter", "Any"),
                ("prop_category_filter", "Any"),
            ]);
            assert_eq!(filter.predicate(), None);

            let filter = Filter::from_params([("prop_type_filter", "House")]);
            assert_eq!(
                filter.predicate(),
                Some(Predicate::Equals(
                    Column::Kind,
                    Value::Text("House".into()),
                )),
            );
        }

        #[test]
        fn price_bounds_are_inclusive() {
            let rows = [
                property(1, |l| l.price = property::Price::new(99)),
                property(2, |l| l.price = property::Price::new(100)),
                property(3, |l| l.price = property::Price::new(150)),
                property(4, |l| l.price = property::Price::new(151)),
                property(5, |l| l.price = None),
            ];
            let filter = Filter::from_params([
                ("min_price_filter", "100"),
                ("max_price_filter", "R 150"),
            ]);

            assert_eq!(matching(&filter, &rows), [2, 3]);
        }

        #[test]
        fn inverted_price_range_is_rejected_before_querying() {
            let filter = Filter::from_params([
                ("min_price_filter", "100"),
                ("max_price_filter", "50"),
            ]);

            assert_eq!(
                filter.validate(),
                Err(FilterError::PriceRange { min: 100, max: 50 }),
            );
            assert!(
                Selector::new(pagination::Arguments::default(), filter)
                    .is_err(),
            );
        }

        #[test]
        fn formatted_prices_keep_digits_only() {
            let filter = Filter::from_params([("min_price_filter", "1,250,000")]);

            assert_eq!(filter.min_price, Some(1_250_000));
        }

        #[test]
        fn last_non_blank_value_wins() {
            let filter = Filter::from_params([
                ("agent_filter", "Anna"),
                ("agent_filter", "Ben"),
                ("agent_filter", ""),
            ]);

            assert_eq!(filter.agent.as_deref(), Some("Ben"));
        }

        #[test]
        fn clauses_are_not_duplicated() {
            let filter = Filter::from_params([
                ("study_filter", "on"),
                ("study_filter", "on"),
                ("agent_filter", "Anna"),
            ]);

            assert_eq!(
                filter.predicate(),
                Some(Predicate::All(vec![
                    Predicate::Equals(Column::Study, Value::Flag(true)),
                    Predicate::Contains(Column::Agent, "Anna".into()),
                ])),
            );
        }

        #[test]
        fn predicate_is_idempotent() {
            let filter = Filter::from_params([
                ("area_filter", "Sandton"),
                ("bathroom_filter", "2+"),
                ("pet_friendly_filter", "on"),
            ]);
            let rows = [
                property(1, |l| {
                    l.area = property::Area::new("Sandton");
                    l.bathrooms = "2.5".parse().ok();
                    l.amenities.pet_friendly = true;
                }),
                property(2, |l| l.area = property::Area::new("Sandton")),
            ];

            assert_eq!(filter.predicate(), filter.predicate());
            assert_eq!(matching(&filter, &rows), matching(&filter, &rows));
            assert_eq!(matching(&filter, &rows), [1]);
        }
    }
}
