//! Tolling Vision wire messages
//!
//! Protobuf messages of the `TollingVisionService.Analyze` server-streaming
//! RPC, declared with prost derives.

/// Fully qualified RPC path of the analyze call
pub const ANALYZE_PATH: &str =
    "/com.smartcloudsolutions.tollingvision.TollingVisionService/Analyze";

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Image {
    #[prost(bytes = "vec", tag = "1")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EventRequest {
    #[prost(message, repeated, tag = "1")]
    pub front_image: Vec<Image>,
    #[prost(message, repeated, tag = "2")]
    pub rear_image: Vec<Image>,
    #[prost(message, repeated, tag = "3")]
    pub overview_image: Vec<Image>,
}

impl EventRequest {
    /// Number of images across all three roles
    pub fn image_count(&self) -> usize {
        self.front_image.len() + self.rear_image.len() + self.overview_image.len()
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Plate {
    #[prost(string, tag = "1")]
    pub text: String,
    #[prost(string, tag = "2")]
    pub country: String,
    #[prost(string, tag = "3")]
    pub state: String,
    #[prost(string, tag = "4")]
    pub category: String,
    #[prost(int32, tag = "5")]
    pub confidence: i32,
    #[prost(int32, tag = "6")]
    pub text_confidence: i32,
    #[prost(int32, tag = "7")]
    pub plate_type_confidence: i32,
}

/// Make and model recognition
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Mmr {
    #[prost(string, tag = "1")]
    pub make: String,
    #[prost(string, tag = "2")]
    pub model: String,
    #[prost(string, tag = "3")]
    pub generation: String,
    #[prost(string, tag = "4")]
    pub category: String,
    #[prost(string, tag = "5")]
    pub body_type: String,
    #[prost(string, tag = "6")]
    pub view_point: String,
    #[prost(string, tag = "7")]
    pub color_name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EventResult {
    #[prost(string, tag = "1")]
    pub node: String,
    #[prost(message, optional, tag = "2")]
    pub front_plate: Option<Plate>,
    #[prost(message, repeated, tag = "3")]
    pub front_plate_alternative: Vec<Plate>,
    #[prost(message, optional, tag = "4")]
    pub rear_plate: Option<Plate>,
    #[prost(message, repeated, tag = "5")]
    pub rear_plate_alternative: Vec<Plate>,
    #[prost(message, optional, tag = "6")]
    pub mmr: Option<Mmr>,
    #[prost(message, repeated, tag = "7")]
    pub mmr_alternative: Vec<Mmr>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ErrorResponse {
    #[prost(int32, tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SearchStatus {
    Unspecified = 0,
    Processing = 1,
    Result = 2,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchResponse {
    #[prost(enumeration = "SearchStatus", tag = "1")]
    pub status: i32,
}

impl SearchResponse {
    pub fn is_result(&self) -> bool {
        self.status == SearchStatus::Result as i32
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PartialResult {
    #[prost(uint32, tag = "1")]
    pub result_index: u32,
    #[prost(oneof = "partial_result::Outcome", tags = "2, 3")]
    pub outcome: Option<partial_result::Outcome>,
}

pub mod partial_result {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Outcome {
        #[prost(message, tag = "2")]
        Error(super::ErrorResponse),
        #[prost(message, tag = "3")]
        Result(super::SearchResponse),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EventResponse {
    #[prost(oneof = "event_response::Payload", tags = "1, 2")]
    pub payload: Option<event_response::Payload>,
}

pub mod event_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "1")]
        EventResult(super::EventResult),
        #[prost(message, tag = "2")]
        PartialResult(super::PartialResult),
    }
}

impl EventResponse {
    pub fn event_result(result: EventResult) -> Self {
        Self {
            payload: Some(event_response::Payload::EventResult(result)),
        }
    }

    pub fn partial(result: PartialResult) -> Self {
        Self {
            payload: Some(event_response::Payload::PartialResult(result)),
        }
    }
}
