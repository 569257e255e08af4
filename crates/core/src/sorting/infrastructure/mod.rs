pub mod fs_directory_lister;
pub mod fs_file_action;
