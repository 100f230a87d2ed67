use std::io::Cursor;
use vpxdec::CodecId;
use vpxdec_cli::ivf::{IvfError, IvfReader};

fn ivf(fourcc: &[u8; 4], frames: &[(u64, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"DKIF");
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&32u16.to_le_bytes());
    out.extend_from_slice(fourcc);
    out.extend_from_slice(&320u16.to_le_bytes());
    out.extend_from_slice(&240u16.to_le_bytes());
    out.extend_from_slice(&30u32.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&(frames.len() as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    for (pts, data) in frames {
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&pts.to_le_bytes());
        out.extend_from_slice(data);
    }
    out
}

#[test]
fn reads_header_and_frames() {
    let bytes = ivf(b"VP80", &[(0, &[1, 2, 3]), (1, &[4])]);
    let mut reader = IvfReader::new(Cursor::new(bytes)).unwrap();
    let header = *reader.header();
    assert_eq!(header.codec(), Some(CodecId::Vp8));
    assert_eq!((header.width, header.height), (320, 240));
    assert_eq!(header.frame_count, 2);

    let first = reader.next_frame().unwrap().unwrap();
    assert_eq!((first.pts, first.data), (0, vec![1, 2, 3]));
    let second = reader.next_frame().unwrap().unwrap();
    assert_eq!((second.pts, second.data), (1, vec![4]));
    assert!(reader.next_frame().unwrap().is_none());
}

#[test]
fn vp9_fourcc_maps_to_vp9() {
    let reader = IvfReader::new(Cursor::new(ivf(b"VP90", &[]))).unwrap();
    assert_eq!(reader.header().codec(), Some(CodecId::Vp9));
    let reader = IvfReader::new(Cursor::new(ivf(b"AV01", &[]))).unwrap();
    assert_eq!(reader.header().codec(), None);
}

#[test]
fn rejects_garbage_and_truncation() {
    assert!(matches!(
        IvfReader::new(Cursor::new(b"RIFF".to_vec())),
        Err(IvfError::BadSignature)
    ));

    let mut bytes = ivf(b"VP80", &[(0, &[1, 2, 3, 4])]);
    bytes.truncate(bytes.len() - 2);
    let mut reader = IvfReader::new(Cursor::new(bytes)).unwrap();
    assert!(matches!(reader.next_frame(), Err(IvfError::Truncated(0))));
}

#[test]
fn oversized_frame_length_reports_truncation() {
    let mut bytes = ivf(b"VP80", &[]);
    bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    bytes.extend_from_slice(&7u64.to_le_bytes());
    bytes.extend_from_slice(&[1, 2, 3]);
    let mut reader = IvfReader::new(Cursor::new(bytes)).unwrap();
    assert!(matches!(reader.next_frame(), Err(IvfError::Truncated(0))));
}
