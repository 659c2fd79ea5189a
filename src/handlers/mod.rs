//! HTTP handlers, generic over the resource path segment.

pub mod resource;
