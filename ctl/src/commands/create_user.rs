use std::io::Write;

use anyhow::{Context, bail};
use clap::Parser;
use eventhub_common::params::RegisterUserParams;
use eventhub_db::{
    models::DbUser,
    password::{DEFAULT_COST, hash_password},
    storage::{StoreError, UserStore},
};

#[derive(Clone, Parser)]
pub struct CreateUserParams {
    #[clap(short, long)]
    pub name: String,

    #[clap(short, long)]
    pub email: String,

    #[clap(short, long)]
    pub password: String,

    /// One of `user`, `admin` or `organizer`.
    #[clap(short, long, default_value = "user")]
    pub role: String,

    #[clap(
        long,
        default_value_t = DEFAULT_COST,
        value_parser = clap::value_parser!(u32).range(4..=31)
    )]
    pub bcrypt_cost: u32,
}

pub async fn create_user(
    stg: &impl UserStore,
    CreateUserParams {
        name,
        email,
        password,
        role,
        bcrypt_cost,
    }: CreateUserParams,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    // Same checks as the registration endpoint.
    let new_user = RegisterUserParams {
        name: Some(name),
        email: Some(email),
        password: Some(password),
        role: Some(role),
    }
    .validate()?;

    let password_hash =
        hash_password(&new_user.password, bcrypt_cost).context("Failed to hash password")?;

    let user = DbUser::new(new_user.name, new_user.email, password_hash, new_user.role);
    let user = match UserStore::create(stg, user).await {
        Ok(user) => user,
        Err(StoreError::DuplicateKey(email)) => bail!("A user with email {email} already exists"),
        Err(e) => return Err(e.into()),
    };

    writeln!(out, "Created {} with ID {}", user.role, user.id)?;

    Ok(())
}
