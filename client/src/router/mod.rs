pub mod ig_router;
pub mod transfer_info;
pub mod type_bound_waitlist;
