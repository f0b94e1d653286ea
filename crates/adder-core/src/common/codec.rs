//! Protobuf codec used by the generated client and server.
//!
//! Behaves like the stock prost codec except for decode failures: a payload
//! that is not a valid encoding of the expected message is reported as
//! [`Error::MalformedRequest`], which maps to `INVALID_ARGUMENT`. The stock
//! codec reports the same condition as `INTERNAL`.

use crate::common::error::Error;
use core::marker::PhantomData;
use prost::Message;
use tonic::{
    Status,
    codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder},
};

/// A [`Codec`] that encodes `T` and decodes `U` with prost.
#[derive(Debug, Clone, Copy)]
pub struct ProtoCodec<T, U> {
    _pd: PhantomData<(T, U)>,
}

impl<T, U> Default for ProtoCodec<T, U> {
    fn default() -> Self {
        Self { _pd: PhantomData }
    }
}

impl<T, U> Codec for ProtoCodec<T, U>
where
    T: Message + Send + 'static,
    U: Message + Default + Send + 'static,
{
    type Encode = T;
    type Decode = U;
    type Encoder = ProtoEncoder<T>;
    type Decoder = ProtoDecoder<U>;

    fn encoder(&mut self) -> Self::Encoder {
        ProtoEncoder { _pd: PhantomData }
    }

    fn decoder(&mut self) -> Self::Decoder {
        ProtoDecoder { _pd: PhantomData }
    }
}

/// Encoder half of [`ProtoCodec`].
#[derive(Debug, Clone, Copy)]
pub struct ProtoEncoder<T> {
    _pd: PhantomData<T>,
}

impl<T: Message> Encoder for ProtoEncoder<T> {
    type Item = T;
    type Error = Status;

    fn encode(&mut self, item: Self::Item, buf: &mut EncodeBuf<'_>) -> Result<(), Self::Error> {
        // EncodeBuf grows on demand, so running out of capacity is a bug.
        item.encode(buf)
            .map_err(|e| Status::internal(format!("Error encoding message: {e}")))
    }
}

/// Decoder half of [`ProtoCodec`].
#[derive(Debug, Clone, Copy)]
pub struct ProtoDecoder<U> {
    _pd: PhantomData<U>,
}

impl<U: Message + Default> Decoder for ProtoDecoder<U> {
    type Item = U;
    type Error = Status;

    fn decode(&mut self, buf: &mut DecodeBuf<'_>) -> Result<Option<Self::Item>, Self::Error> {
        let item = decode_message(buf)?;
        Ok(Some(item))
    }
}

/// Decodes a single message, classifying failures as malformed input.
pub fn decode_message<U, B>(buf: B) -> Result<U, Status>
where
    U: Message + Default,
    B: prost::bytes::Buf,
{
    U::decode(buf).map_err(|e| {
        Error::MalformedRequest {
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::proto::{Number, TwoNumbers};
    use tonic::Code;

    #[test]
    fn decodes_a_valid_operand_pair() {
        let encoded = TwoNumbers { a: 2.0, b: 3.0 }.encode_to_vec();
        let decoded: TwoNumbers = decode_message(encoded.as_slice()).unwrap();
        assert_eq!(decoded, TwoNumbers { a: 2.0, b: 3.0 });
    }

    #[test]
    fn empty_payload_decodes_to_zeroes() {
        // proto3 omits default values, so (0, 0) is encoded as nothing.
        let decoded: TwoNumbers = decode_message(&[][..]).unwrap();
        assert_eq!(decoded, TwoNumbers { a: 0.0, b: 0.0 });
    }

    #[test]
    fn truncated_double_is_invalid_argument() {
        // Field 1, wire type 1 (64-bit), followed by only two bytes.
        let status = decode_message::<TwoNumbers, _>(&[0x09, 0x00, 0x01][..]).unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[test]
    fn wrong_wire_type_is_invalid_argument() {
        // Field 1 declared as length-delimited, but `a` is a double.
        let status = decode_message::<TwoNumbers, _>(&[0x0A, 0x01, 0x00][..]).unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
        assert!(status.message().starts_with("Malformed request"));
    }

    #[test]
    fn result_message_decodes() {
        let encoded = Number { result: -0.5 }.encode_to_vec();
        let decoded: Number = decode_message(encoded.as_slice()).unwrap();
        assert_eq!(decoded.result, -0.5);
    }
}
