use crate::{crud_api, value_router};
use movlib_dal::movie_instance::{CreateMovieInstance, MovieInstanceRepository};

crud_api!(MovieInstanceRepository, CreateMovieInstance);

value_router!();
