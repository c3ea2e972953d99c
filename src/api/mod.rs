use rocket::Route;

mod auth;
mod participation;
mod questions;
mod results;
mod surveys;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(surveys::routes());
    routes.extend(questions::routes());
    routes.extend(participation::routes());
    routes.extend(results::routes());
    routes
}
