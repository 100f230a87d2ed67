use vpxdec::engine::mock::{MockFactory, MockImage, MockResponse};
use vpxdec::image::{ALPHA_PLANE, OPAQUE_ALPHA};
use vpxdec::packet::ALPHA_HEADER_LEN;
use vpxdec::{registry, DecoderConfig, FrameHost, OutputFormat, Packet, Session, StreamContext};

fn solid(width: u32, height: u32, values: [u8; 3]) -> MockResponse {
    MockResponse::Image(MockImage::solid(width, height, values).with_padding(7))
}

#[test]
fn two_engine_round_trip() {
    let factory = MockFactory::new(vec![
        vec![solid(32, 18, [81, 90, 240])],
        vec![solid(32, 18, [170, 128, 128])],
    ]);
    let stats = factory.stats();
    let config = registry::find_by_name("libvpxalpha").unwrap().config(4);
    let mut host = StreamContext::new(32, 18);
    let mut session = Session::open(&factory, &config, &mut host).unwrap();

    let packet = Packet::with_alpha(vec![0x9d; 100], &[0x42; 37]);
    let output = session.decode(&mut host, &packet).unwrap();
    assert!(output.produced_frame());
    assert_eq!(output.bytes_consumed, 100);

    let frame = output.frame.unwrap();
    assert_eq!(frame.format, OutputFormat::Yuva420p);
    assert_eq!((frame.width, frame.height), (32, 18));
    let expected = [(81u8, 32usize, 18usize), (90, 16, 9), (240, 16, 9), (170, 32, 18)];
    for (plane, (value, width, rows)) in expected.iter().enumerate() {
        let plane = frame.plane(plane).unwrap();
        assert_eq!(plane.rows, *rows);
        for row in 0..*rows {
            assert_eq!(plane.row(row).unwrap(), vec![*value; *width].as_slice());
        }
    }

    let side = &packet.side_data[0].data;
    let fed = stats.fed_to(1);
    assert_eq!(fed.len(), 1);
    assert_eq!(fed[0].len(), side.len() - ALPHA_HEADER_LEN);
    assert_eq!(fed[0].as_slice(), &side[ALPHA_HEADER_LEN..]);

    session.close();
    assert_eq!(stats.dropped(), 2);
}

#[test]
fn packets_without_side_data_are_opaque() {
    let factory = MockFactory::new(vec![vec![solid(10, 6, [1, 2, 3])], vec![solid(10, 6, [4, 5, 6])]]);
    let mut host = StreamContext::new(10, 6);
    let config = DecoderConfig {
        alpha: true,
        ..Default::default()
    };
    let mut session = Session::open(&factory, &config, &mut host).unwrap();
    for _ in 0..3 {
        let frame = session
            .decode(&mut host, &Packet::new(vec![1; 10]))
            .unwrap()
            .frame
            .unwrap();
        let alpha = frame.plane(ALPHA_PLANE).unwrap();
        for row in 0..alpha.rows {
            assert!(alpha.line(row).unwrap().iter().all(|&b| b == OPAQUE_ALPHA));
        }
    }
    assert!(factory.stats().fed_to(1).is_empty());
}

#[test]
fn dimension_change_is_reported_once() {
    let factory = MockFactory::new(vec![vec![
        solid(64, 48, [0; 3]),
        solid(64, 48, [0; 3]),
        solid(32, 24, [0; 3]),
    ]]);
    let mut host = StreamContext::new(64, 48);
    let mut session = Session::open(&factory, &DecoderConfig::default(), &mut host).unwrap();

    let mut changes = Vec::new();
    let mut sizes = Vec::new();
    for _ in 0..5 {
        let output = session.decode(&mut host, &Packet::new(vec![0; 8])).unwrap();
        changes.push(output.dimensions_changed);
        let frame = output.frame.unwrap();
        sizes.push((frame.width, frame.height));
    }
    assert_eq!(changes, vec![false, false, true, false, false]);
    assert_eq!(sizes, vec![(64, 48), (64, 48), (32, 24), (32, 24), (32, 24)]);
    assert_eq!(host.dimensions(), (32, 24));
    assert_eq!(host.dimension_changes(), 1);
}

#[test]
fn failed_color_packet_leaves_session_usable() {
    let factory = MockFactory::new(vec![
        vec![
            MockResponse::fail("Corrupt frame", Some("Invalid partition size")),
            solid(8, 8, [1, 2, 3]),
        ],
        vec![solid(8, 8, [9, 9, 9])],
    ]);
    let config = DecoderConfig {
        alpha: true,
        ..Default::default()
    };
    let mut host = StreamContext::new(8, 8);
    let mut session = Session::open(&factory, &config, &mut host).unwrap();
    let packet = Packet::with_alpha(vec![0; 16], &[0; 16]);

    let err = session.decode(&mut host, &packet).unwrap_err();
    assert_eq!(err.code(), vpxdec::ErrorCode::InvalidData);
    assert!(factory.stats().fed_to(1).is_empty());

    let output = session.decode(&mut host, &packet).unwrap();
    assert!(output.produced_frame());
}
