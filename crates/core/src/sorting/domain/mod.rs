pub mod directory_lister;
pub mod dispatch_pair;
pub mod file_action;
