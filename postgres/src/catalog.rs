use sqlx::{PgPool, prelude::FromRow};
use tracing::debug;

/// An active product joined with its first variant and first image, as stored.
///
/// Every column except `is_active` may be null: products without variants or
/// images still produce a row.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ProductRow {
    pub sku: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub age_group: Option<String>,
    pub image_url: Option<String>,
    pub is_new: Option<bool>,
    pub is_active: bool,
}

/// Fetches all active products ordered by product id.
///
/// The first variant is the one with the lowest id and the first image is the
/// one with the lowest display order.
pub async fn fetch_active_product_rows(pool: &PgPool) -> sqlx::Result<Vec<ProductRow>> {
    let rows = sqlx::query_as::<_, ProductRow>(
        r#"
        select
            p.sku::text as sku,
            p.name::text as title,
            p.description::text as description,
            v.price::float8 as price,
            v.color::text as color,
            v.size::text as size,
            v.age::text as age_group,
            pi.image::text as image_url,
            p.is_new as is_new,
            p.active as is_active
        from products p
        left join lateral (
            select price, color, size, age
            from product_variants
            where product_id = p.id
            order by id asc
            limit 1
        ) v on true
        left join lateral (
            select image
            from product_images
            where product_id = p.id
            order by "order" asc
            limit 1
        ) pi on true
        where p.active = true
        order by p.id asc
        "#,
    )
    .fetch_all(pool)
    .await?;
    debug!(rows = rows.len(), "fetched active catalog products");

    Ok(rows)
}
