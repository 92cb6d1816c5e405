mod account;
mod fill;
mod order;
mod variables;

pub use account::{Account, AccountName};
pub use fill::{Fill, FillSource, FillStatus, Posting};
pub use order::Order;
pub use variables::Variables;
