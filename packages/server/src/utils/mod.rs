pub mod object_key;
pub mod short_id;
