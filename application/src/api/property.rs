//! Property listing endpoints.

use std::str::FromStr;

use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        Path,
    },
    response::Response,
    Form,
};
use serde_json::{json, Value};
#[cfg(doc)]
use service::domain::Property;
use service::{
    command::{self, Command as _},
    domain::property,
    query,
};

use crate::{define_error, AsError, Context, Error, Flash};

use super::{dashboard::PropertyPayload, Params};

/// Page of a single [`Property`].
pub async fn view(
    ctx: Context,
    path: Result<Path<i32>, PathRejection>,
) -> Response {
    match show(&ctx, path).await {
        Ok(data) => ctx.render("view_property.html", data),
        Err(e) => ctx.fail(e, "/dashboard"),
    }
}

async fn show(
    ctx: &Context,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Value, Error> {
    let is_admin = ctx.require_access().await?.is_admin;
    let id = property_id(path)?;

    let property = ctx
        .service()
        .execute(query::property::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or(PropertyError::NotExists)?;

    let listing = &property.listing;
    let mut data = json!({
        "property": PropertyPayload::from(&property),
        "is_admin": is_admin,
    });
    data["property"]["stand_area"] = json!(listing.stand_area);
    data["property"]["floor_area"] = json!(listing.floor_area);
    data["property"]["note"] = json!(listing.note);
    Ok(data)
}

/// Page with the form adding a new [`Property`].
pub async fn add_page(ctx: Context) -> Response {
    match ctx.require_admin().await {
        Ok(_) => ctx.render("add_property.html", json!({})),
        Err(e) => ctx.fail(e, "/dashboard"),
    }
}

/// Adds a new [`Property`] out of the submitted form.
pub async fn add(
    mut ctx: Context,
    form: Result<Form<Params>, FormRejection>,
) -> Response {
    match create(&ctx, form).await {
        Ok(id) => {
            ctx.flash(Flash::success("Property added successfully."));
            ctx.redirect(&format!("/view_property/{id}"))
        }
        Err(e) => ctx.fail(e, "/add_property"),
    }
}

async fn create(
    ctx: &Context,
    form: Result<Form<Params>, FormRejection>,
) -> Result<property::Id, Error> {
    _ = ctx.require_admin().await?;
    let Form(params) = form.map_err(AsError::into_error)?;

    let property = ctx
        .service()
        .execute(command::CreateProperty {
            listing: listing(&params)?,
        })
        .await
        .map_err(AsError::into_error)?;
    tracing::info!("`Property({})` added", property.id);

    Ok(property.id)
}

/// Replaces details of a [`Property`] with the submitted form.
pub async fn update(
    mut ctx: Context,
    path: Result<Path<i32>, PathRejection>,
    form: Result<Form<Params>, FormRejection>,
) -> Response {
    let id = match property_id(path) {
        Ok(id) => id,
        Err(e) => return ctx.fail(e, "/dashboard"),
    };
    let to = format!("/view_property/{id}");

    match edit(&ctx, id, form).await {
        Ok(()) => {
            ctx.flash(Flash::success("Property updated successfully."));
            ctx.redirect(&to)
        }
        Err(e) => ctx.fail(e, &to),
    }
}

async fn edit(
    ctx: &Context,
    property_id: property::Id,
    form: Result<Form<Params>, FormRejection>,
) -> Result<(), Error> {
    _ = ctx.require_admin().await?;
    let Form(params) = form.map_err(AsError::into_error)?;

    _ = ctx
        .service()
        .execute(command::UpdateProperty {
            property_id,
            listing: listing(&params)?,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(())
}

/// Deletes a [`Property`].
pub async fn delete(
    mut ctx: Context,
    path: Result<Path<i32>, PathRejection>,
) -> Response {
    match remove(&ctx, path).await {
        Ok(()) => {
            ctx.flash(Flash::success("Property deleted successfully."));
            ctx.redirect("/dashboard")
        }
        Err(e) => ctx.fail(e, "/dashboard"),
    }
}

async fn remove(
    ctx: &Context,
    path: Result<Path<i32>, PathRejection>,
) -> Result<(), Error> {
    _ = ctx.require_admin().await?;
    let property_id = property_id(path)?;

    let property = ctx
        .service()
        .execute(command::DeleteProperty { property_id })
        .await
        .map_err(AsError::into_error)?;
    tracing::info!("`Property({})` deleted", property.id);

    Ok(())
}

/// Extracts a [`property::Id`] out of the request path.
fn property_id(
    path: Result<Path<i32>, PathRejection>,
) -> Result<property::Id, Error> {
    let Path(id) = path.map_err(AsError::into_error)?;
    Ok(id.into())
}

/// Returns the last value of the form field with the provided `name`.
fn field<'p>(params: &'p Params, name: &str) -> Option<&'p str> {
    params
        .iter()
        .rev()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

/// Parses an optional detail out of the form field with the provided `name`.
fn detail<T: FromStr>(
    params: &Params,
    name: &'static str,
) -> Result<Option<T>, Error> {
    super::optional(field(params, name)).map_err(|()| invalid(name))
}

/// Parses a [`property::Listing`] out of the submitted form `params`.
///
/// Blank fields are left empty, and checkboxes are set if present.
fn listing(params: &Params) -> Result<property::Listing, Error> {
    let flag = |name| field(params, name).is_some();

    Ok(property::Listing {
        street_name: detail(params, "street_name")?,
        street_number: detail(params, "street_number")?,
        complex_name: detail(params, "complex_name")?,
        complex_number: detail(params, "complex_number")?,
        area: detail(params, "area")?,
        price: detail(params, "price")?,
        bedrooms: detail(params, "bedrooms")?,
        bathrooms: detail(params, "bathrooms")?,
        garages: detail(params, "garages")?,
        carports: detail(params, "carports")?,
        stand_area: detail(params, "stand_area")?,
        floor_area: detail(params, "floor_area")?,
        amenities: property::Amenities {
            swimming_pool: flag("swimming_pool"),
            garden_flat: flag("garden_flat"),
            study: flag("study"),
            ground_floor: flag("ground_floor"),
            pet_friendly: flag("pet_friendly"),
        },
        kind: detail(params, "prop_type")?,
        category: detail(params, "prop_category")?,
        agent: detail(params, "agent")?,
        link: detail(params, "link")?,
        link_display: detail(params, "link_display")?,
        note: detail(params, "note")?,
    })
}

/// Creates an [`Error`] of the invalid form field with the provided `name`.
fn invalid(name: &str) -> Error {
    Error {
        code: "INVALID_PROPERTY_DETAIL",
        status_code: http::StatusCode::BAD_REQUEST,
        backtrace: None,
        message: format!("Please check the `{name}` field."),
    }
}

impl AsError for command::create_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
        }
    }
}

impl AsError for command::delete_property::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PropertyNotExists(_) => Some(PropertyError::NotExists.into()),
        }
    }
}

define_error! {
    enum PropertyError {
        #[code = "PROPERTY_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Property does not exist."]
        NotExists,
    }
}

#[cfg(test)]
mod spec {
    use service::domain::property;

    use super::listing;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn parses_filled_form() {
        let listing = listing(&params(&[
            ("street_name", " Main Road "),
            ("street_number", "12"),
            ("area", "Claremont"),
            ("price", "1,250,000"),
            ("bedrooms", "3"),
            ("bathrooms", "2.5"),
            ("stand_area", "450"),
            ("study", "on"),
            ("prop_type", "House"),
            ("link", "https://example.com/12"),
        ]))
        .unwrap();

        assert_eq!(listing.street_name, property::StreetName::new("Main Road"));
        assert_eq!(listing.street_number, property::StreetNumber::new("12"));
        assert_eq!(listing.price, property::Price::new(1_250_000));
        assert_eq!(listing.bedrooms, property::Rooms::new(3));
        assert_eq!(listing.bathrooms, "2.5".parse().ok());
        assert_eq!(listing.stand_area, property::SquareMeters::new(450));
        assert!(listing.amenities.study);
        assert!(!listing.amenities.swimming_pool);
        assert_eq!(listing.kind, property::Kind::new("House"));
        assert_eq!(listing.complex_name, None);
    }

    #[test]
    fn leaves_blank_fields_empty() {
        let listing =
            listing(&params(&[("street_name", "  "), ("bedrooms", "")]))
                .unwrap();

        assert_eq!(listing, property::Listing::default());
    }

    #[test]
    fn rejects_invalid_details() {
        let long = "x".repeat(31);
        for (name, value) in [
            ("bedrooms", "three"),
            ("bedrooms", "-1"),
            ("bathrooms", "2.25"),
            ("link_display", long.as_str()),
        ] {
            let err = listing(&params(&[(name, value)])).unwrap_err();

            assert_eq!(err.code, "INVALID_PROPERTY_DETAIL", "{name}={value}");
            assert!(err.message.contains(name));
        }
    }
}
