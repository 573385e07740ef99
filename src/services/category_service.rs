use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::{
    entity::categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories},
    error::AppResult,
    models::Category,
    response::ApiResponse,
    state::AppState,
};

pub const DEFAULT_CATEGORIES: [(&str, &str); 5] = [
    ("Paper", "Newspaper, cardboard, office paper and cartons."),
    ("Plastic", "PET bottles, containers and packaging film."),
    ("Metal", "Aluminium cans, iron, copper and steel scrap."),
    ("Glass", "Bottles and jars, sorted by colour where possible."),
    ("E-waste", "Discarded electronics, cables and batteries."),
];

/// Insert any default category that is missing. Returns how many were added.
pub async fn ensure_default_categories<C: ConnectionTrait>(conn: &C) -> Result<usize, DbErr> {
    let mut created = 0;
    for (name, description) in DEFAULT_CATEGORIES {
        let exists = Categories::find()
            .filter(CategoryCol::Name.eq(name))
            .one(conn)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let now = Utc::now();
        CategoryActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(conn)
        .await?;
        created += 1;
    }

    if created > 0 {
        tracing::info!(created, "default categories seeded");
    }
    Ok(created)
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<Vec<Category>>> {
    let categories = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();

    Ok(ApiResponse::success("Ok", categories, None))
}
