use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxUserRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxFollowRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxPhotoRepo {
    pub pool: PgPool,
}
