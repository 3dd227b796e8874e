//! [`Property`] definitions.

use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Real-estate listing.
#[derive(Clone, Debug)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// [`Listing`] details of this [`Property`].
    pub listing: Listing,
}

/// Details of a [`Property`] listing.
///
/// Every detail is optional, so a [`Listing`] may be filled gradually.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Listing {
    /// [`StreetName`] of the [`Property`].
    pub street_name: Option<StreetName>,

    /// [`StreetNumber`] of the [`Property`].
    pub street_number: Option<StreetNumber>,

    /// [`ComplexName`] the [`Property`] is located in.
    pub complex_name: Option<ComplexName>,

    /// [`ComplexNumber`] of the [`Property`] inside its complex.
    pub complex_number: Option<ComplexNumber>,

    /// [`Area`] the [`Property`] is located in.
    pub area: Option<Area>,

    /// Asking [`Price`] of the [`Property`].
    pub price: Option<Price>,

    /// Number of bedrooms.
    pub bedrooms: Option<Rooms>,

    /// Number of [`Bathrooms`].
    pub bathrooms: Option<Bathrooms>,

    /// Number of garages.
    pub garages: Option<Rooms>,

    /// Number of carports.
    pub carports: Option<Rooms>,

    /// Area of the stand.
    pub stand_area: Option<SquareMeters>,

    /// Area of the floor.
    pub floor_area: Option<SquareMeters>,

    /// [`Amenities`] of the [`Property`].
    pub amenities: Amenities,

    /// [`Kind`] of the [`Property`].
    pub kind: Option<Kind>,

    /// [`Category`] of the [`Property`].
    pub category: Option<Category>,

    /// [`Agent`] responsible for the [`Property`].
    pub agent: Option<Agent>,

    /// External [`Link`] to the [`Property`] advertisement.
    pub link: Option<Link>,

    /// Text displayed instead of the [`Link`].
    pub link_display: Option<LinkDisplay>,

    /// Free-text [`Note`] about the [`Property`].
    pub note: Option<Note>,
}

/// ID of a [`Property`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i32);

/// Boolean features of a [`Property`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Amenities {
    /// Whether the [`Property`] has a swimming pool.
    pub swimming_pool: bool,

    /// Whether the [`Property`] is a garden flat.
    pub garden_flat: bool,

    /// Whether the [`Property`] has a study.
    pub study: bool,

    /// Whether the [`Property`] is on the ground floor.
    pub ground_floor: bool,

    /// Whether pets are allowed.
    pub pet_friendly: bool,
}

/// Defines bounded text newtypes.
macro_rules! define_text {
    ($(
        $(#[doc = $doc:literal])*
        $name:ident(max = $max:literal)
    ),* $(,)?) => {$(
        $(#[doc = $doc])*
        #[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
        #[as_ref(str, String)]
        #[cfg_attr(
            feature = "postgres",
            derive(FromSql, ToSql),
            postgres(transparent)
        )]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Maximum number of characters in a [`", stringify!($name), "`].")]
            pub const MAX_LEN: usize = $max;

            #[doc = concat!("Creates a new [`", stringify!($name), "`] if the given `value` is valid.")]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                Self::check(&value).then_some(Self(value))
            }

            #[doc = concat!("Checks whether the given `value` is a valid [`", stringify!($name), "`].")]
            fn check(value: &str) -> bool {
                value.trim() == value
                    && !value.is_empty()
                    && value.chars().count() <= Self::MAX_LEN
            }
        }

        impl FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s).ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }
    )*};
}

define_text! {
    /// Name of a street.
    StreetName(max = 100),

    /// Number of a building on a street.
    StreetNumber(max = 30),

    /// Name of a residential complex.
    ComplexName(max = 100),

    /// Number of a unit inside a residential complex.
    ComplexNumber(max = 30),

    /// Suburb or region.
    Area(max = 30),

    /// Type of a [`Property`] (house, apartment, etc).
    Kind(max = 255),

    /// Category of a [`Property`] (for sale, to rent, etc).
    Category(max = 255),

    /// Name of an agent.
    Agent(max = 255),

    /// URL of an external advertisement.
    Link(max = 100),

    /// Text of a [`Link`] shown to users.
    LinkDisplay(max = 30),

    /// Free-text note.
    Note(max = 255),
}

/// Defines non-negative integer newtypes.
macro_rules! define_number {
    ($(
        $(#[doc = $doc:literal])*
        $name:ident($ty:ty)
    ),* $(,)?) => {$(
        $(#[doc = $doc])*
        #[derive(
            Clone,
            Copy,
            Debug,
            Display,
            Eq,
            Into,
            Ord,
            PartialEq,
            PartialOrd,
            Serialize,
        )]
        #[cfg_attr(
            feature = "postgres",
            derive(FromSql, ToSql),
            postgres(transparent)
        )]
        pub struct $name($ty);

        impl $name {
            #[doc = concat!("Creates a new [`", stringify!($name), "`] if the given `value` is not negative.")]
            #[must_use]
            pub fn new(value: $ty) -> Option<Self> {
                (value >= 0).then_some(Self(value))
            }
        }

        impl FromStr for $name {
            type Err = &'static str;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse()
                    .ok()
                    .and_then(Self::new)
                    .ok_or(concat!("invalid `", stringify!($name), "`"))
            }
        }
    )*};
}

define_number! {
    /// Number of rooms of some kind.
    Rooms(i32),

    /// Area in square meters.
    SquareMeters(i32),
}

/// Price of a [`Property`] in whole currency units.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Price(i64);

impl Price {
    /// Creates a new [`Price`] if the given `value` is not negative.
    #[must_use]
    pub fn new(value: i64) -> Option<Self> {
        (value >= 0).then_some(Self(value))
    }

    /// Parses a [`Price`] out of a formatted number, like `1,250,000`.
    ///
    /// Only the ASCII digits of the `input` are considered.
    #[must_use]
    pub fn parse_formatted(input: &str) -> Option<Self> {
        let digits = input
            .chars()
            .filter(char::is_ascii_digit)
            .collect::<String>();
        digits.parse().ok().map(Self)
    }
}

impl FromStr for Price {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_formatted(s).ok_or("invalid `Price`")
    }
}

/// Number of bathrooms, allowing halves like `2.5`.
#[derive(
    Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd, Serialize,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Bathrooms(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Bathrooms {
    /// Creates new [`Bathrooms`] if the given `value` is non-negative, below
    /// `10` and has at most one decimal place.
    #[must_use]
    pub fn new(value: Decimal) -> Option<Self> {
        let value = value.normalize();
        (!value.is_sign_negative()
            && value < Decimal::TEN
            && value.scale() <= 1)
            .then_some(Self(value))
    }
}

impl FromStr for Bathrooms {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Decimal>()
            .ok()
            .and_then(Self::new)
            .ok_or("invalid `Bathrooms`")
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{Area, Bathrooms, Price, Rooms, StreetNumber};

    #[test]
    fn text_rejects_blank_untrimmed_and_long_values() {
        assert!(Area::new("Sandton").is_some());
        assert!(Area::new("").is_none());
        assert!(Area::new(" Sandton").is_none());
        assert!(Area::new("a".repeat(Area::MAX_LEN)).is_some());
        assert!(Area::new("a".repeat(Area::MAX_LEN + 1)).is_none());
        assert!(StreetNumber::new("12A").is_some());
    }

    #[test]
    fn text_length_counts_characters() {
        assert!(Area::new("é".repeat(Area::MAX_LEN)).is_some());
    }

    #[test]
    fn price_keeps_digits_only() {
        assert_eq!(Price::parse_formatted("1,250,000"), Price::new(1_250_000));
        assert_eq!(Price::parse_formatted("R 900 000"), Price::new(900_000));
        assert_eq!(Price::parse_formatted("n/a"), None);
        assert_eq!(Price::parse_formatted(""), None);
    }

    #[test]
    fn rooms_are_not_negative() {
        assert_eq!("3".parse::<Rooms>().ok(), Rooms::new(3));
        assert!("-1".parse::<Rooms>().is_err());
        assert!("two".parse::<Rooms>().is_err());
    }

    #[test]
    fn bathrooms_allow_a_single_decimal_place() {
        assert!("2.5".parse::<Bathrooms>().is_ok());
        assert!("2.50".parse::<Bathrooms>().is_ok());
        assert!("1".parse::<Bathrooms>().is_ok());
        assert!("2.25".parse::<Bathrooms>().is_err());
        assert!("10".parse::<Bathrooms>().is_err());
        assert!("-1".parse::<Bathrooms>().is_err());
        assert_eq!(
            Bathrooms::new(Decimal::new(250, 2)),
            Bathrooms::new(Decimal::new(25, 1)),
        );
    }
}
