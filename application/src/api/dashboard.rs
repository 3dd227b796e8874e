//! Property catalog endpoints.

use axum::{
    async_trait,
    extract::{
        rejection::QueryRejection, FromRequest, Multipart, Query, Request,
    },
    response::Response,
    Form,
};
use common::pagination::{self, Window};
use serde::Serialize;
use serde_json::{json, Value};
use service::{
    domain::{property, Property},
    query::{self, Query as _},
    read::property::list::{self, Filter, FilterError, Selector},
};

use crate::{define_error, AsError, Context, Error};

use super::Params;

/// Dashboard page, filtered by the query string.
pub async fn page(
    ctx: Context,
    params: Result<Query<Params>, QueryRejection>,
) -> Response {
    match render_page(&ctx, params).await {
        Ok(data) => ctx.render("dashboard.html", data),
        Err(e) => ctx.fail(e, "/"),
    }
}

async fn render_page(
    ctx: &Context,
    params: Result<Query<Params>, QueryRejection>,
) -> Result<Value, Error> {
    let user = ctx.require_access().await?;
    let Query(params) = params.map_err(AsError::into_error)?;

    let page = select(ctx, &params, page_number(&params)).await?;
    let areas = ctx
        .service()
        .execute(query::properties::Areas::by(()))
        .await
        .map_err(AsError::into_error)?;
    let filters = params
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect::<serde_json::Map<_, _>>();

    let mut data = page_json(&page);
    data["areas"] = json!(areas.0);
    data["filters"] = Value::Object(filters);
    data["is_admin"] = json!(user.is_admin);
    Ok(data)
}

/// Filtered page of the properties requested by the dashboard script.
pub async fn list(
    ctx: Context,
    query: Result<Query<Params>, QueryRejection>,
    FilterParams(params): FilterParams,
) -> Response {
    match list_page(&ctx, query, params).await {
        Ok(data) => ctx.json(data),
        Err(e) => ctx.fail_json(e),
    }
}

async fn list_page(
    ctx: &Context,
    query: Result<Query<Params>, QueryRejection>,
    params: Params,
) -> Result<Value, Error> {
    _ = ctx.require_access().await?;
    let Query(query) = query.map_err(AsError::into_error)?;

    let page = select(ctx, &params, page_number(&query)).await?;
    Ok(page_json(&page))
}

/// Selects a page of the properties matching the provided filter `params`.
async fn select(
    ctx: &Context,
    params: &Params,
    page: Option<u32>,
) -> Result<list::Page, Error> {
    let filter = if params.iter().any(|(k, _)| k == "reset_filters") {
        Filter::default()
    } else {
        Filter::from_params(params.iter().map(|(k, v)| (k, v)))
    };
    let selector = Selector::new(pagination::Arguments::new(page), filter)
        .map_err(AsError::into_error)?;

    ctx.service()
        .execute(query::properties::List::by(selector))
        .await
        .map_err(AsError::into_error)
}

/// Extracts the requested page number, ignoring malformed ones.
fn page_number(query: &Params) -> Option<u32> {
    query
        .iter()
        .rev()
        .find(|(k, _)| k == "page")
        .and_then(|(_, v)| v.trim().parse().ok())
}

/// Renders the provided [`list::Page`] as the dashboard script expects it.
fn page_json(page: &list::Page) -> Value {
    json!({
        "properties": page
            .items
            .iter()
            .map(PropertyPayload::from)
            .collect::<Vec<_>>(),
        "pagination": {
            "total": page.total,
            "per_page": page.per_page(),
            "current_page": page.current_page(),
            "pages": page.pages(),
            "paginationHTML": pagination_html(&page.window()),
        },
    })
}

/// Renders the provided [`Window`] as a Bootstrap pagination fragment.
///
/// An empty [`Window`] renders into nothing.
#[must_use]
pub fn pagination_html(window: &Window) -> String {
    /// Renders a single item, disabled if it leads nowhere.
    fn item(page: Option<u32>, label: &str, active: bool) -> String {
        let class = if active { " active" } else { "" };
        match page {
            Some(n) => format!(
                r##"<li class="page-item{class}"><a class="page-link pagination-link" href="#" data-page="{n}">{label}</a></li>"##,
            ),
            None => format!(
                r#"<li class="page-item disabled"><span class="page-link">{label}</span></li>"#,
            ),
        }
    }

    if window.entries.is_empty() {
        return String::new();
    }

    let mut items = vec![item(window.previous, "&laquo;", false)];
    if window.leading_ellipsis {
        items.push(item(None, "&hellip;", false));
    }
    items.extend(window.entries.iter().map(|e| {
        item(Some(e.number), &e.number.to_string(), e.active)
    }));
    if window.trailing_ellipsis {
        items.push(item(None, "&hellip;", false));
    }
    items.push(item(window.next, "&raquo;", false));

    format!(r#"<ul class="pagination">{}</ul>"#, items.concat())
}

/// [`Property`] as listed on the dashboard.
#[derive(Debug, Serialize)]
pub struct PropertyPayload<'p> {
    id: property::Id,
    street_number: Option<&'p property::StreetNumber>,
    street_name: Option<&'p property::StreetName>,
    complex_number: Option<&'p property::ComplexNumber>,
    complex_name: Option<&'p property::ComplexName>,
    area: Option<&'p property::Area>,
    price: Option<property::Price>,
    bedrooms: Option<property::Rooms>,
    bathrooms: Option<property::Bathrooms>,
    garages: Option<property::Rooms>,
    carports: Option<property::Rooms>,
    swimming_pool: bool,
    garden_flat: bool,
    study: bool,
    ground_floor: bool,
    pet_friendly: bool,
    prop_type: Option<&'p property::Kind>,
    prop_category: Option<&'p property::Category>,
    agent: Option<&'p property::Agent>,
    link: Option<&'p property::Link>,
    link_display: Option<&'p property::LinkDisplay>,
}

impl<'p> From<&'p Property> for PropertyPayload<'p> {
    fn from(property: &'p Property) -> Self {
        let l = &property.listing;
        Self {
            id: property.id,
            street_number: l.street_number.as_ref(),
            street_name: l.street_name.as_ref(),
            complex_number: l.complex_number.as_ref(),
            complex_name: l.complex_name.as_ref(),
            area: l.area.as_ref(),
            price: l.price,
            bedrooms: l.bedrooms,
            bathrooms: l.bathrooms,
            garages: l.garages,
            carports: l.carports,
            swimming_pool: l.amenities.swimming_pool,
            garden_flat: l.amenities.garden_flat,
            study: l.amenities.study,
            ground_floor: l.amenities.ground_floor,
            pet_friendly: l.amenities.pet_friendly,
            prop_type: l.kind.as_ref(),
            prop_category: l.category.as_ref(),
            agent: l.agent.as_ref(),
            link: l.link.as_ref(),
            link_display: l.link_display.as_ref(),
        }
    }
}

/// Filter parameters submitted either as a URL-encoded or a multipart form.
///
/// Bodies of any other type carry no parameters.
#[derive(Debug)]
pub struct FilterParams(pub Params);

#[async_trait]
impl<S> FromRequest<S> for FilterParams
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Error> {
        let content_type = req
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(AsError::into_error)?;
            let mut params = Vec::new();
            while let Some(field) =
                multipart.next_field().await.map_err(AsError::into_error)?
            {
                if field.file_name().is_some() {
                    continue;
                }
                let Some(name) = field.name().map(ToOwned::to_owned) else {
                    continue;
                };
                let value = field.text().await.map_err(AsError::into_error)?;
                params.push((name, value));
            }
            Ok(Self(params))
        } else if content_type.starts_with("application/x-www-form-urlencoded")
        {
            let Form(params) = Form::<Params>::from_request(req, state)
                .await
                .map_err(AsError::into_error)?;
            Ok(Self(params))
        } else {
            Ok(Self(Vec::new()))
        }
    }
}

impl AsError for FilterError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::PriceRange { .. } => Some(DashboardError::PriceRange.into()),
        }
    }
}

define_error! {
    enum DashboardError {
        #[code = "INVALID_PRICE_RANGE"]
        #[status = BAD_REQUEST]
        #[message = "Minimum price cannot exceed maximum price."]
        PriceRange,
    }
}

#[cfg(test)]
mod spec {
    use common::pagination::Window;
    use service::domain::{
        property::{self, Amenities, Listing},
        Property,
    };

    use super::{page_number, pagination_html, PropertyPayload};

    #[test]
    fn renders_window_around_middle_page() {
        let html = pagination_html(&Window::new(10, 5));

        assert!(html.starts_with(r#"<ul class="pagination">"#));
        assert!(html.ends_with("</ul>"));
        assert_eq!(html.matches("&hellip;").count(), 2);
        assert!(html.contains(
            r##"<li class="page-item"><a class="page-link pagination-link" href="#" data-page="4">&laquo;</a></li>"##,
        ));
        assert!(html.contains(
            r##"<li class="page-item active"><a class="page-link pagination-link" href="#" data-page="5">5</a></li>"##,
        ));
        assert!(html.contains(
            r##"<li class="page-item"><a class="page-link pagination-link" href="#" data-page="6">&raquo;</a></li>"##,
        ));
        assert_eq!(html.matches("page-item active").count(), 1);
    }

    #[test]
    fn disables_unreachable_edges() {
        let html = pagination_html(&Window::new(1, 1));

        assert_eq!(
            html,
            concat!(
                r#"<ul class="pagination">"#,
                r#"<li class="page-item disabled"><span class="page-link">&laquo;</span></li>"#,
                r##"<li class="page-item active"><a class="page-link pagination-link" href="#" data-page="1">1</a></li>"##,
                r#"<li class="page-item disabled"><span class="page-link">&raquo;</span></li>"#,
                "</ul>",
            ),
        );
    }

    #[test]
    fn renders_nothing_without_pages() {
        assert_eq!(pagination_html(&Window::new(0, 1)), "");
    }

    #[test]
    fn parses_page_leniently() {
        let query = |v: &str| vec![("page".to_owned(), v.to_owned())];

        assert_eq!(page_number(&query("3")), Some(3));
        assert_eq!(page_number(&query(" 2 ")), Some(2));
        assert_eq!(page_number(&query("two")), None);
        assert_eq!(page_number(&query("-1")), None);
        assert_eq!(page_number(&Vec::new()), None);
    }

    #[test]
    fn serializes_dashboard_payload() {
        let property = Property {
            id: property::Id::from(3_i32),
            listing: Listing {
                street_name: property::StreetName::new("Main Road"),
                area: property::Area::new("Claremont"),
                price: property::Price::new(1_250_000),
                bathrooms: "2.5".parse().ok(),
                amenities: Amenities {
                    study: true,
                    ..Amenities::default()
                },
                kind: property::Kind::new("House"),
                note: property::Note::new("Not listed"),
                ..Listing::default()
            },
        };

        let json =
            serde_json::to_value(PropertyPayload::from(&property)).unwrap();

        assert_eq!(json["id"], 3);
        assert_eq!(json["street_name"], "Main Road");
        assert_eq!(json["area"], "Claremont");
        assert_eq!(json["price"], 1_250_000);
        assert_eq!(json["bathrooms"], 2.5);
        assert_eq!(json["study"], true);
        assert_eq!(json["swimming_pool"], false);
        assert_eq!(json["prop_type"], "House");
        assert!(json["street_number"].is_null());
        assert!(json.get("note").is_none());
    }
}
