pub mod interceptor;

pub use interceptor::{AuthInterceptor, authenticated_user};
