// @generated
// This file wires up buf-generated protobuf code
// Note: The prost files already include!() the tonic files automatically

pub mod shard {
    include!("generated/shard/v1/shard.v1.rs");
    // shard.v1.tonic.rs is auto-included by shard.v1.rs
}

pub mod frontend {
    include!("generated/frontend/v1/frontend.v1.rs");
    // frontend.v1.tonic.rs is auto-included by frontend.v1.rs
}
