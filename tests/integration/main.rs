//! Integration tests driven through the public library API.

mod batch_run;
mod scenarios;
