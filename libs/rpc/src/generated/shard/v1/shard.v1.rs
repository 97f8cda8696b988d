// @generated
// This file is @generated by prost-build.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Vector {
    #[prost(float, repeated, tag="1")]
    pub values: ::prost::alloc::vec::Vec<f32>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchRequest {
    #[prost(message, optional, tag="1")]
    pub query: ::core::option::Option<Vector>,
    #[prost(uint32, tag="2")]
    pub limit: u32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchResponse {
    #[prost(uint64, repeated, tag="1")]
    pub keys: ::prost::alloc::vec::Vec<u64>,
    #[prost(float, repeated, tag="2")]
    pub distances: ::prost::alloc::vec::Vec<f32>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AddRequest {
    #[prost(uint64, tag="1")]
    pub key: u64,
    #[prost(message, optional, tag="2")]
    pub vector: ::core::option::Option<Vector>,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct AddResponse {
    #[prost(bool, tag="1")]
    pub shard_full: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AddMultiRequest {
    #[prost(uint64, repeated, tag="1")]
    pub keys: ::prost::alloc::vec::Vec<u64>,
    #[prost(message, repeated, tag="2")]
    pub vectors: ::prost::alloc::vec::Vec<Vector>,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct AddMultiResponse {
    #[prost(uint64, tag="1")]
    pub inserted: u64,
    #[prost(bool, tag="2")]
    pub shard_full: bool,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct GetRequest {
    #[prost(uint64, tag="1")]
    pub key: u64,
    #[prost(int64, tag="2")]
    pub count: i64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetResponse {
    #[prost(message, optional, tag="1")]
    pub vector: ::core::option::Option<Vector>,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct HasRequest {
    #[prost(uint64, tag="1")]
    pub key: u64,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct HasResponse {
    #[prost(bool, tag="1")]
    pub ok: bool,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct DeleteRequest {
    #[prost(uint64, tag="1")]
    pub key: u64,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct DeleteResponse {
    #[prost(bool, tag="1")]
    pub ok: bool,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Empty {
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct LengthResponse {
    #[prost(uint64, tag="1")]
    pub length: u64,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct CapacityResponse {
    #[prost(uint64, tag="1")]
    pub capacity: u64,
}
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct SizeResponse {
    #[prost(uint64, tag="1")]
    pub size: u64,
}
include!("shard.v1.tonic.rs");
// @@protoc_insertion_point(module)
