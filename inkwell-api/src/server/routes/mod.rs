use crate::server::ServerRouter;
use inkwell_core::store::EntityStore;

mod feed;
mod groups;
mod posts;
mod users;

pub fn routes<St: EntityStore>() -> ServerRouter<St> {
    ServerRouter::new()
        .merge(posts::routes())
        .merge(groups::routes())
        .merge(users::routes())
        .merge(feed::routes())
}
