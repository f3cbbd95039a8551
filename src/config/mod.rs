pub mod resolve;
pub mod store;
pub mod types;

pub use resolve::{EnvOverrides, Resolver, DEFAULT_BASE_URL};
pub use store::{generate_slug_from_url, ConfigStore};
pub use types::{AuthMode, Config, Profile, ProfileView};
