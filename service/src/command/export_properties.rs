//! [`Command`] for emailing selected [`Property`] listings to a [`User`].

use std::{collections::HashMap, fmt::Write as _};

use common::operations::{By, Deliver, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{property, user, Property, User},
    infra::{database, mailer, Database, Mailer},
    Service,
};

use super::Command;

/// [`Command`] for emailing the selected [`Property`] listings to the
/// requesting [`User`].
#[derive(Clone, Debug)]
pub struct ExportProperties {
    /// ID of the requesting [`User`].
    pub user_id: user::Id,

    /// IDs of the selected [`Property`] listings, in the order to be listed.
    pub property_ids: Vec<property::Id>,
}

impl<Db, M> Command<ExportProperties> for Service<Db, M>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<HashMap<property::Id, Property>, Vec<property::Id>>>,
            Ok = HashMap<property::Id, Property>,
            Err = Traced<database::Error>,
        >,
    M: Mailer<
        Deliver<mailer::Message>,
        Ok = (),
        Err = Traced<mailer::Error>,
    >,
{
    /// [`user::Email`] the listings were sent to.
    type Ok = user::Email;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ExportProperties,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ExportProperties {
            user_id,
            mut property_ids,
        } = cmd;

        let mut seen = Vec::with_capacity(property_ids.len());
        property_ids.retain(|id| {
            let fresh = !seen.contains(id);
            if fresh {
                seen.push(*id);
            }
            fresh
        });
        if property_ids.is_empty() {
            return Err(tracerr::new!(E::NothingSelected));
        }

        let user = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        let mut found = self
            .database()
            .execute(Select(By::<HashMap<_, _>, _>::new(
                property_ids.clone(),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let properties = property_ids
            .iter()
            .filter_map(|id| found.remove(id))
            .collect::<Vec<_>>();
        if properties.is_empty() {
            return Err(tracerr::new!(E::NothingSelected));
        }

        let mut body = format!(
            "Hello {},\n\nHere are the {} selected properties:\n",
            user.name,
            properties.len(),
        );
        for p in &properties {
            body.push('\n');
            body.push_str(&describe(p));
        }

        self.mailer()
            .execute(Deliver(mailer::Message {
                to: vec![user.email.clone()],
                reply_to: None,
                subject: "Selected properties".to_owned(),
                body,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(user.email)
    }
}

/// Describes the provided [`Property`] as plain text, listing only the known
/// details.
#[must_use]
pub fn describe(property: &Property) -> String {
    let l = &property.listing;

    let mut out = String::new();
    let address = [
        l.complex_number.as_ref().map(AsRef::<str>::as_ref),
        l.complex_name.as_ref().map(AsRef::<str>::as_ref),
        l.street_number.as_ref().map(AsRef::<str>::as_ref),
        l.street_name.as_ref().map(AsRef::<str>::as_ref),
        l.area.as_ref().map(AsRef::<str>::as_ref),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<&str>>()
    .join(" ");
    // Writing into a `String` never fails.
    _ = writeln!(out, "Property #{}: {address}", property.id);

    if let Some(price) = l.price {
        _ = writeln!(out, "  Price: R {}", group_thousands(price.into()));
    }
    let rooms = [
        ("Bedrooms", l.bedrooms.map(|n| n.to_string())),
        ("Bathrooms", l.bathrooms.map(|n| n.to_string())),
        ("Garages", l.garages.map(|n| n.to_string())),
        ("Carports", l.carports.map(|n| n.to_string())),
        ("Stand area", l.stand_area.map(|n| format!("{n} m²"))),
        ("Floor area", l.floor_area.map(|n| format!("{n} m²"))),
    ];
    for (label, value) in rooms {
        if let Some(v) = value {
            _ = writeln!(out, "  {label}: {v}");
        }
    }

    let a = l.amenities;
    let amenities = [
        (a.swimming_pool, "swimming pool"),
        (a.garden_flat, "garden flat"),
        (a.study, "study"),
        (a.ground_floor, "ground floor"),
        (a.pet_friendly, "pet friendly"),
    ]
    .into_iter()
    .filter_map(|(has, name)| has.then_some(name))
    .collect::<Vec<_>>();
    if !amenities.is_empty() {
        _ = writeln!(out, "  Features: {}", amenities.join(", "));
    }

    if let Some(kind) = &l.kind {
        _ = writeln!(out, "  Type: {kind}");
    }
    if let Some(category) = &l.category {
        _ = writeln!(out, "  Category: {category}");
    }
    if let Some(agent) = &l.agent {
        _ = writeln!(out, "  Agent: {agent}");
    }
    if let Some(link) = &l.link {
        _ = match &l.link_display {
            Some(text) => writeln!(out, "  Link: {text} ({link})"),
            None => writeln!(out, "  Link: {link}"),
        };
    }
    out
}

/// Formats the provided number grouping its digits by thousands with spaces.
fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() * 4 / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// Error of [`ExportProperties`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Mailer`] error.
    #[display("`Mailer` operation failed: {_0}")]
    #[from]
    Mailer(mailer::Error),

    /// None of the selected [`Property`] listings exist.
    #[display("No properties selected")]
    NothingSelected,

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use crate::domain::{
        property::{self, Amenities, Listing},
        Property,
    };

    use super::{describe, group_thousands};

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1 000");
        assert_eq!(group_thousands(1_250_000), "1 250 000");
        assert_eq!(group_thousands(-12_345), "-12 345");
    }

    #[test]
    fn describes_known_details_only() {
        let property = Property {
            id: property::Id::from(7_i32),
            listing: Listing {
                street_name: property::StreetName::new("Oak Avenue"),
                street_number: property::StreetNumber::new("12"),
                area: property::Area::new("Sandton"),
                price: property::Price::new(1_250_000),
                bedrooms: property::Rooms::new(3),
                bathrooms: "2.5".parse().ok(),
                amenities: Amenities {
                    study: true,
                    pet_friendly: true,
                    ..Amenities::default()
                },
                kind: property::Kind::new("House"),
                link: property::Link::new("https://example.com/7"),
                link_display: property::LinkDisplay::new("Ad"),
                ..Listing::default()
            },
        };

        assert_eq!(
            describe(&property),
            "Property #7: 12 Oak Avenue Sandton\n\
             \x20 Price: R 1 250 000\n\
             \x20 Bedrooms: 3\n\
             \x20 Bathrooms: 2.5\n\
             \x20 Features: study, pet friendly\n\
             \x20 Type: House\n\
             \x20 Link: Ad (https://example.com/7)\n",
        );
    }

    #[test]
    fn describes_empty_listing() {
        let property = Property {
            id: property::Id::from(1_i32),
            listing: Listing::default(),
        };

        assert_eq!(describe(&property), "Property #1: \n");
    }
}
