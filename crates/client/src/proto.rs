//! Wire types and client stubs generated from `proto/csi.proto`.

#![allow(clippy::all)]

tonic::include_proto!("csi.v1");
