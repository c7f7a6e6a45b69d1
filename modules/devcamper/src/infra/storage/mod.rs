pub mod docstore_repo;
pub mod mapper;

pub use docstore_repo::{
    declare_collections, repositories, DocstoreBootcampsRepository, DocstoreCoursesRepository,
    DocstoreReviewsRepository, DocstoreUsersRepository, BOOTCAMPS, COURSES, REVIEWS, USERS,
};
