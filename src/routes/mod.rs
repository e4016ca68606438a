pub mod auth;
pub mod health;
pub mod projects;
pub mod reports;
pub mod tasks;
pub mod users;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::index)
        .service(health::health)
        .service(
            web::scope("/auth")
                .service(auth::register)
                .service(auth::login)
                .service(auth::refresh)
                .service(auth::me),
        )
        .service(
            web::scope("/users")
                .service(users::get_me)
                .service(users::update_me)
                .service(users::list_users)
                .service(users::get_user),
        )
        .service(
            web::scope("/projects")
                .service(projects::get_projects)
                .service(projects::create_project)
                .service(projects::get_project)
                .service(projects::update_project)
                .service(projects::delete_project),
        )
        .service(
            web::scope("/tasks")
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        )
        .service(
            web::scope("/reports")
                .service(reports::completion)
                .service(reports::overdue)
                .service(reports::projects),
        );
}
