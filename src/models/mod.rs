mod account;
mod forms;
mod quote;
mod session;
mod view;
mod workspace;

pub use account::{Account, NewAccount, Role};
pub use forms::{LoginForm, NewAccountForm, SellerForm};
pub use quote::{QuoteData, QuoteField};
pub use session::SessionState;
pub use view::View;
pub use workspace::{Attachment, UploadSlot, Workspace};
