//! Account flows.
//!
//! Signup, signin, refresh and revoke. Each flow decides when to mint
//! tokens; the token service does the minting.

mod session;
mod signin;
mod signup;
mod types;

pub use session::SessionFlow;
pub use signin::SigninFlow;
pub use signup::SignupFlow;
pub use types::*;
