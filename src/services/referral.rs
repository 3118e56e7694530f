//! Registration and referral accrual.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::config::loyalty::LoyaltyConfig;
use crate::error::{AppError, Result};
use crate::models::referral_code;
use crate::models::user::{self, UserRole};
use crate::services::security::{generate_referral_code, hash_password};

const MAX_CODE_ATTEMPTS: usize = 8;

/// Input for a new account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub referral_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub user: user::Model,
    pub referral_code: referral_code::Model,
    /// Owner of the code used at sign-up, if any
    pub referred_by: Option<i64>,
}

/// Issue a fresh, unused referral code to `user_id`.
pub async fn issue_code<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<referral_code::Model> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = generate_referral_code();
        let taken = referral_code::Entity::find()
            .filter(referral_code::Column::Code.eq(code.as_str()))
            .count(db)
            .await?
            > 0;
        if taken {
            continue;
        }

        let model = referral_code::ActiveModel {
            user_id: Set(user_id),
            code: Set(code),
            referral_points: Set(0),
            count_used: Set(0),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        return Ok(model);
    }

    Err(AppError::Internal(
        "Could not generate a unique referral code".to_string(),
    ))
}

/// Look up a referral code, ignoring case and surrounding whitespace.
pub async fn find_code<C: ConnectionTrait>(
    db: &C,
    code: &str,
) -> Result<Option<referral_code::Model>> {
    let normalized = code.trim().to_ascii_uppercase();
    Ok(referral_code::Entity::find()
        .filter(referral_code::Column::Code.eq(normalized))
        .one(db)
        .await?)
}

pub async fn codes_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
) -> Result<Vec<referral_code::Model>> {
    Ok(referral_code::Entity::find()
        .filter(referral_code::Column::UserId.eq(user_id))
        .order_by_asc(referral_code::Column::Id)
        .all(db)
        .await?)
}

/// Create a user, issue their own code, and credit the referrer if a code was given.
///
/// Everything happens in one transaction: an unknown code or a taken email
/// leaves the database untouched.
pub async fn register(
    db: &DatabaseConnection,
    loyalty: &LoyaltyConfig,
    input: NewUser,
) -> Result<Registration> {
    let hashed_password = hash_password(&input.password)?;
    let email = input.email.trim().to_lowercase();
    let username = input.username.trim().to_string();

    let txn = db.begin().await?;

    let existing = user::Entity::find()
        .filter(
            user::Column::Email
                .eq(email.as_str())
                .or(user::Column::Username.eq(username.as_str())),
        )
        .one(&txn)
        .await?;
    if let Some(existing) = existing {
        let field = if existing.email == email {
            "Email"
        } else {
            "Username"
        };
        return Err(AppError::Conflict(format!("{} is already registered", field)));
    }

    let referrer = match input
        .referral_code
        .as_deref()
        .filter(|code| !code.trim().is_empty())
    {
        Some(code) => Some(
            find_code(&txn, code)
                .await?
                .ok_or_else(|| AppError::BadRequest("Invalid referral code".to_string()))?,
        ),
        None => None,
    };

    let now = chrono::Utc::now();
    let new_user = user::ActiveModel {
        username: Set(username),
        email: Set(email),
        hashed_password: Set(hashed_password),
        role: Set(UserRole::User),
        points: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| {
        if AppError::is_unique_violation(&e) {
            AppError::Conflict("Email is already registered".to_string())
        } else {
            e.into()
        }
    })?;

    let own_code = issue_code(&txn, new_user.id).await?;

    let referred_by = match referrer {
        Some(code) => {
            credit_referral(&txn, &code, loyalty.referral_points).await?;
            Some(code.user_id)
        }
        None => None,
    };

    txn.commit().await?;

    tracing::info!(
        user_id = new_user.id,
        referred_by = ?referred_by,
        "Registered user {}",
        new_user.username
    );

    Ok(Registration {
        user: new_user,
        referral_code: own_code,
        referred_by,
    })
}

async fn credit_referral<C: ConnectionTrait>(
    db: &C,
    code: &referral_code::Model,
    amount: i64,
) -> Result<()> {
    referral_code::Entity::update_many()
        .col_expr(
            referral_code::Column::CountUsed,
            Expr::col(referral_code::Column::CountUsed).add(1),
        )
        .col_expr(
            referral_code::Column::ReferralPoints,
            Expr::col(referral_code::Column::ReferralPoints).add(amount),
        )
        .filter(referral_code::Column::Id.eq(code.id))
        .exec(db)
        .await?;

    user::Entity::update_many()
        .col_expr(user::Column::Points, Expr::col(user::Column::Points).add(amount))
        .col_expr(user::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(user::Column::Id.eq(code.user_id))
        .exec(db)
        .await?;

    tracing::debug!(
        code = %code.code,
        owner = code.user_id,
        amount,
        "Credited referral"
    );
    Ok(())
}
