mod direct_tests;
mod remote_tests;
