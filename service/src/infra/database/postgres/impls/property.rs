//! [`Property`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::{
    operations::{By, Delete, Insert, Lock, Select, Update},
    unit,
};
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        property::{self, Amenities, Listing},
        Property,
    },
    infra::{
        database::{
            self,
            postgres::{Connection, Sql},
            Postgres,
        },
        Database,
    },
    read,
};

/// Columns of a [`Property`] selected by [`property_from_row`].
const COLUMNS: &str = "\
    id, street_name, street_number, complex_name, complex_number, area, \
    price, bedrooms, bathrooms, garages, carports, stand_area, floor_area, \
    swimming_pool, garden_flat, study, ground_floor, pet_friendly, \
    prop_type, prop_category, agent, link, link_display, note";

/// Builds a [`Property`] out of the [`Row`] containing [`COLUMNS`].
fn property_from_row(row: &Row) -> Property {
    Property {
        id: row.get("id"),
        listing: Listing {
            street_name: row.get("street_name"),
            street_number: row.get("street_number"),
            complex_name: row.get("complex_name"),
            complex_number: row.get("complex_number"),
            area: row.get("area"),
            price: row.get("price"),
            bedrooms: row.get("bedrooms"),
            bathrooms: row.get("bathrooms"),
            garages: row.get("garages"),
            carports: row.get("carports"),
            stand_area: row.get("stand_area"),
            floor_area: row.get("floor_area"),
            amenities: Amenities {
                swimming_pool: row.get("swimming_pool"),
                garden_flat: row.get("garden_flat"),
                study: row.get("study"),
                ground_floor: row.get("ground_floor"),
                pet_friendly: row.get("pet_friendly"),
            },
            kind: row.get("prop_type"),
            category: row.get("prop_category"),
            agent: row.get("agent"),
            link: row.get("link"),
            link_display: row.get("link_display"),
            note: row.get("note"),
        },
    }
}

impl<C, IDs> Database<Select<By<HashMap<property::Id, Property>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[property::Id]>,
{
    type Ok = HashMap<property::Id, Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<property::Id, Property>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        // Avoid subtle change for SQL.
        let ids: &[property::Id] = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM properties \
             WHERE id = ANY($1::INT4[])",
        );
        Ok(self
            .query(&sql, &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| {
                let property = property_from_row(row);
                (property.id, property)
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Property>, property::Id>>> for Postgres<C>
where
    C: Connection,
    Self: Database<
        Select<By<HashMap<property::Id, Property>, [property::Id; 1]>>,
        Ok = HashMap<property::Id, Property>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .execute(Select(By::new([id])))
            .await
            .map_err(tracerr::wrap!())?
            .remove(&id))
    }
}

impl<C> Database<Select<By<property::Id, unit::Issuing>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = property::Id;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<property::Id, unit::Issuing>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT nextval(pg_get_serial_sequence('properties', 'id'))::INT4";
        Ok(self
            .query_one(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .get(0))
    }
}

impl<C> Database<Insert<Property>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Property>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(property)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Property>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(property): Update<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        let Property {
            id,
            listing:
                Listing {
                    street_name,
                    street_number,
                    complex_name,
                    complex_number,
                    area,
                    price,
                    bedrooms,
                    bathrooms,
                    garages,
                    carports,
                    stand_area,
                    floor_area,
                    amenities:
                        Amenities {
                            swimming_pool,
                            garden_flat,
                            study,
                            ground_floor,
                            pet_friendly,
                        },
                    kind,
                    category,
                    agent,
                    link,
                    link_display,
                    note,
                },
        } = property;

        const SQL: &str = "\
            INSERT INTO properties (\
                id, street_name, street_number, complex_name, complex_number, \
                area, price, \
                bedrooms, bathrooms, garages, carports, \
                stand_area, floor_area, \
                swimming_pool, garden_flat, study, ground_floor, pet_friendly, \
                prop_type, prop_category, agent, \
                link, link_display, note\
            ) VALUES (\
                $1::INT4, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, $5::VARCHAR, \
                $6::VARCHAR, $7::INT8, \
                $8::INT4, $9::NUMERIC, $10::INT4, $11::INT4, \
                $12::INT4, $13::INT4, \
                $14::BOOL, $15::BOOL, $16::BOOL, $17::BOOL, $18::BOOL, \
                $19::VARCHAR, $20::VARCHAR, $21::VARCHAR, \
                $22::VARCHAR, $23::VARCHAR, $24::VARCHAR\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET street_name = EXCLUDED.street_name, \
                street_number = EXCLUDED.street_number, \
                complex_name = EXCLUDED.complex_name, \
                complex_number = EXCLUDED.complex_number, \
                area = EXCLUDED.area, \
                price = EXCLUDED.price, \
                bedrooms = EXCLUDED.bedrooms, \
                bathrooms = EXCLUDED.bathrooms, \
                garages = EXCLUDED.garages, \
                carports = EXCLUDED.carports, \
                stand_area = EXCLUDED.stand_area, \
                floor_area = EXCLUDED.floor_area, \
                swimming_pool = EXCLUDED.swimming_pool, \
                garden_flat = EXCLUDED.garden_flat, \
                study = EXCLUDED.study, \
                ground_floor = EXCLUDED.ground_floor, \
                pet_friendly = EXCLUDED.pet_friendly, \
                prop_type = EXCLUDED.prop_type, \
                prop_category = EXCLUDED.prop_category, \
                agent = EXCLUDED.agent, \
                link = EXCLUDED.link, \
                link_display = EXCLUDED.link_display, \
                note = EXCLUDED.note";
        self.exec(
            SQL,
            &[
                &id,
                &street_name,
                &street_number,
                &complex_name,
                &complex_number,
                &area,
                &price,
                &bedrooms,
                &bathrooms,
                &garages,
                &carports,
                &stand_area,
                &floor_area,
                &swimming_pool,
                &garden_flat,
                &study,
                &ground_floor,
                &pet_friendly,
                &kind,
                &category,
                &agent,
                &link,
                &link_display,
                &note,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM properties \
            WHERE id = $1::INT4 \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Property, property::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: property::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM properties \
            WHERE id = $1::INT4";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<
        Select<
            By<read::property::list::Page, read::property::list::Selector>,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = read::property::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::property::list::Page, read::property::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let selector = by.into_inner();
        let arguments = selector.arguments();

        let limit = i64::from(arguments.per_page());
        let offset = i64::try_from(arguments.offset()).unwrap_or(i64::MAX);

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit, &offset];
        let predicate = selector.filter().predicate();
        let filtering = Sql::render(predicate.as_ref(), ps.len());
        ps.extend(filtering.params());

        // Outer `LEFT JOIN` keeps the `total` row for an empty page too.
        let sql = format!(
            "WITH filtered AS (\
                 SELECT {COLUMNS} \
                 FROM properties \
                 WHERE {condition}\
             ) \
             SELECT (SELECT COUNT(*) FROM filtered) AS total, page.* \
             FROM (SELECT 1) AS dummy \
             LEFT JOIN (\
                 SELECT * \
                 FROM filtered \
                 ORDER BY id \
                 LIMIT $1::INT8 \
                 OFFSET $2::INT8\
             ) AS page ON true \
             ORDER BY page.id",
            condition = filtering.condition,
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let total = rows
            .first()
            .map_or(0, |row| row.get::<_, i64>("total"));
        let items = rows
            .iter()
            .filter(|row| row.get::<_, Option<property::Id>>("id").is_some())
            .map(property_from_row);

        Ok(read::property::list::Page::new(
            arguments,
            items,
            u64::try_from(total).unwrap_or_default(),
        ))
    }
}

impl<C> Database<Select<By<read::property::Areas, ()>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = read::property::Areas;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<read::property::Areas, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT DISTINCT area \
            FROM properties \
            WHERE area IS NOT NULL \
            ORDER BY area";
        Ok(self
            .query(SQL, &[])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| row.get::<_, property::Area>("area"))
            .collect::<Vec<_>>()
            .into())
    }
}
