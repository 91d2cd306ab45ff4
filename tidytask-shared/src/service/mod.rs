/// Domain operations shared by the JSON API and the HTML front end
///
/// - `tasks`: task and category operations, stats and the dashboard
/// - `accounts`: registration, login and token handling
///
/// Both services hold an `Arc<dyn Store>` and are cheap to clone.

pub mod accounts;
pub mod tasks;

pub use accounts::{AccountError, AccountService, Registration, TokenPair};
pub use tasks::{Dashboard, Page, TaskService};
