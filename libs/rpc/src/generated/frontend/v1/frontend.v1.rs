// @generated
// This file is @generated by prost-build.
// frontend.v1 declares no messages of its own; it reuses shard.v1.
include!("frontend.v1.tonic.rs");
// @@protoc_insertion_point(module)
