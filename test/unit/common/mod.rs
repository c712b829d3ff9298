mod errors_test;
mod fs_test;
mod json_test;
