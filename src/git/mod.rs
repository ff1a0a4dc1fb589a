mod ref_type;

pub use self::ref_type::RefType;
