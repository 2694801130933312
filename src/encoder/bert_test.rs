//! Tests for the BERT encoder wrapper

use candle_core::Device;
use rstest::*;

use super::bert::*;
use crate::test_fixtures::fixtures::*;

#[fixture]
fn encoder(device: Device) -> BertEncoder {
    let config = tiny_bert_config();
    BertEncoder::load(random_var_builder(&device), &config).unwrap()
}

#[rstest]
fn test_output_size(encoder: BertEncoder) {
    assert_eq!(encoder.output_size(), TINY_HIDDEN);
}

#[rstest]
fn test_encode_shapes(encoder: BertEncoder, device: Device) {
    let ids = token_ids(2, 4, &device);
    let (sequence_output, pooled_output) = encoder.encode(&ids, None, None).unwrap();
    assert_eq!(sequence_output.dims(), &[2, 4, TINY_HIDDEN]);
    assert_eq!(pooled_output.dims(), &[2, TINY_HIDDEN]);
}

#[rstest]
fn test_pooled_output_is_tanh_bounded(encoder: BertEncoder, device: Device) {
    let ids = token_ids(2, 4, &device);
    let (_, pooled_output) = encoder.encode(&ids, None, None).unwrap();
    for row in pooled_output.to_vec2::<f32>().unwrap() {
        for value in row {
            assert!((-1.0..=1.0).contains(&value));
        }
    }
}

#[rstest]
fn test_encode_with_sequence_lengths(encoder: BertEncoder, device: Device) {
    let ids = token_ids(2, 4, &device);
    let (sequence_output, pooled_output) = encoder.encode(&ids, Some(&[4, 2]), None).unwrap();
    assert_eq!(sequence_output.dims(), &[2, 4, TINY_HIDDEN]);
    assert_eq!(pooled_output.dims(), &[2, TINY_HIDDEN]);
}

#[rstest]
fn test_encode_clamps_overlong_lengths(encoder: BertEncoder, device: Device) {
    let ids = token_ids(2, 4, &device);
    // Length above the actual time dimension behaves as "attend everywhere"
    let result = encoder.encode(&ids, Some(&[10, 2]), None);
    assert!(result.is_ok());
}

#[rstest]
fn test_encode_with_segment_ids(encoder: BertEncoder, device: Device) {
    let ids = token_ids(2, 4, &device);
    let segment_ids = default_segment_ids(&ids).unwrap();
    assert_eq!(segment_ids.dims(), &[2, 4]);
    let (sequence_output, _) = encoder.encode(&ids, None, Some(&segment_ids)).unwrap();
    assert_eq!(sequence_output.dims(), &[2, 4, TINY_HIDDEN]);
}

#[rstest]
fn test_encode_is_deterministic(encoder: BertEncoder, device: Device) {
    let ids = token_ids(2, 4, &device);
    let (first_seq, first_pooled) = encoder.encode(&ids, Some(&[4, 3]), None).unwrap();
    let (second_seq, second_pooled) = encoder.encode(&ids, Some(&[4, 3]), None).unwrap();
    assert_eq!(
        first_seq.flatten_all().unwrap().to_vec1::<f32>().unwrap(),
        second_seq.flatten_all().unwrap().to_vec1::<f32>().unwrap()
    );
    assert_eq!(
        first_pooled.flatten_all().unwrap().to_vec1::<f32>().unwrap(),
        second_pooled.flatten_all().unwrap().to_vec1::<f32>().unwrap()
    );
}
