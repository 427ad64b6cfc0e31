//! IO modules - the concrete sources and destinations (zip archives, filesystem)

pub mod dry_run;
pub mod scheme_dict;
pub mod wheel_file;
