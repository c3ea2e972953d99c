use mongodb::bson::doc;
use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    config::Config,
    error::{Error, Result},
    model::{
        api::{
            auth::{AuthToken, AUTH_TOKEN_COOKIE},
            user::UserCredentials,
        },
        db::user::{NewUser, User},
        mongodb::{is_duplicate_key_error, Coll, Id},
    },
};

pub fn routes() -> Vec<Route> {
    routes![signup, signin, signout]
}

#[post("/auth/signup", data = "<credentials>", format = "json")]
async fn signup(
    cookies: &CookieJar<'_>,
    credentials: Json<UserCredentials>,
    new_users: Coll<NewUser>,
    config: &State<Config>,
) -> Result<()> {
    let user: NewUser = credentials.0.try_into()?;

    // The unique index on usernames catches duplicates atomically.
    let result = new_users.insert_one(&user, None).await;
    if is_duplicate_key_error(result.as_ref()) {
        return Err(Error::bad_request(format!(
            "Username already in use: {}",
            user.username
        )));
    }
    let new_id: Id = result?
        .inserted_id
        .as_object_id()
        .unwrap() // Safe because the ID comes directly from the database.
        .into();

    // Signing up also signs in.
    let token = AuthToken { id: new_id };
    cookies.add(token.into_cookie(config));

    Ok(())
}

#[post("/auth/signin", data = "<credentials>", format = "json")]
async fn signin(
    cookies: &CookieJar<'_>,
    credentials: Json<UserCredentials>,
    users: Coll<User>,
    config: &State<Config>,
) -> Result<()> {
    let with_username = doc! {
        "username": credentials.username.trim(),
    };

    let user = users
        .find_one(with_username, None)
        .await?
        .filter(|user| user.verify_password(&credentials.password))
        .ok_or_else(|| {
            Error::unauthorized("No user found with the provided username and password combination")
        })?;

    let token = AuthToken::new(&user);
    cookies.add(token.into_cookie(config));

    Ok(())
}

#[delete("/auth")]
fn signout(cookies: &CookieJar) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}
