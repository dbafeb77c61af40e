use klv_io::{
    encode_ber_length, running_checksum, KlvParser, MisbValue, TsDemuxer, DEFAULT_KLV_PID,
    UAS_LDS_KEY,
};

/// Builds one ST 0601 packet from (tag, value) items, optionally terminated by a valid tag-1
/// checksum item.
fn build_packet(items: &[(u8, Vec<u8>)], checksum: bool) -> Vec<u8> {
    let mut payload = Vec::new();
    for (tag, value) in items {
        payload.push(*tag);
        payload.extend_from_slice(&encode_ber_length(value.len() as u64));
        payload.extend_from_slice(value);
    }
    if checksum {
        payload.extend_from_slice(&[0x01, 0x02, 0x00, 0x00]);
    }
    let mut packet = Vec::new();
    packet.extend_from_slice(&UAS_LDS_KEY);
    packet.extend_from_slice(&encode_ber_length(payload.len() as u64));
    packet.extend_from_slice(&payload);
    if checksum {
        let sum = running_checksum(&packet[..packet.len() - 2]);
        let length = packet.len();
        packet[length - 2..].copy_from_slice(&sum.to_be_bytes());
    }
    packet
}

/// The framer only carves a packet once a following Universal Label confirms it, so every
/// fixture ends with a bare label.
fn with_sentinel(mut stream: Vec<u8>) -> Vec<u8> {
    stream.extend_from_slice(&UAS_LDS_KEY);
    stream
}

fn decode(stream: &[u8]) -> klv_io::DecodedStream {
    KlvParser::new(stream, &UAS_LDS_KEY).decode()
}

#[test]
fn minimal_packet_decodes_checksum_field() {
    let stream = with_sentinel(build_packet(&[], true));
    let result = decode(&stream);
    assert_eq!(result.packets.len(), 1);
    let packet = &result.packets[0];
    assert_eq!(packet.number, 1);
    assert_eq!(packet.len(), 1);
    assert_eq!(packet.get("Checksum"), Some(&MisbValue::Unsigned(0x4C51)));
}

#[test]
fn packet_without_checksum_is_accepted() {
    let stream = with_sentinel(build_packet(&[(65, vec![0x0D])], false));
    let result = decode(&stream);
    assert_eq!(result.packets.len(), 1);
    assert_eq!(
        result.packets[0].get("UAS Datalink LS Version Number"),
        Some(&MisbValue::Float(13.0))
    );
}

#[test]
fn checksum_mismatch_drops_packet_but_consumes_number() {
    let mut bad = build_packet(&[], true);
    let length = bad.len();
    bad[length - 1] ^= 0xFF;
    let good = build_packet(&[(65, vec![0x0D])], true);

    let mut stream = bad;
    stream.extend_from_slice(&good);
    let stream = with_sentinel(stream);

    let result = decode(&stream);
    assert_eq!(result.packets.len(), 1);
    assert_eq!(result.packets[0].number, 2);
    assert!(result.get(1).is_none());
    assert!(result.get(2).is_some());
}

#[test]
fn malformed_packet_drops_but_scanning_continues() {
    /* Item declares five value bytes but the packet ends immediately */
    let mut bad = Vec::new();
    bad.extend_from_slice(&UAS_LDS_KEY);
    bad.extend_from_slice(&[0x02, 0x03, 0x05]);

    let mut stream = bad;
    stream.extend_from_slice(&build_packet(&[(65, vec![0x0D])], false));
    let stream = with_sentinel(stream);

    let result = decode(&stream);
    assert_eq!(result.packets.len(), 1);
    assert_eq!(result.packets[0].number, 2);
}

#[test]
fn last_label_occurrence_is_never_carved() {
    /* Well-formed, but nothing follows to confirm it */
    let stream = build_packet(&[(65, vec![0x0D])], true);
    assert!(decode(&stream).packets.is_empty());
}

#[test]
fn scan_tolerates_leading_noise_and_is_prefix_stable() {
    let mut stream = vec![0xDE, 0xAD, 0xBE, 0xEF];
    stream.extend_from_slice(&build_packet(&[(65, vec![0x0D])], true));
    let stream = with_sentinel(stream);
    let baseline = decode(&stream);
    assert_eq!(baseline.packets.len(), 1);

    /* Appending bytes past the last label must not change earlier acceptance */
    let mut extended = stream.clone();
    extended.extend_from_slice(&[0x55; 40]);
    assert_eq!(decode(&extended), baseline);
}

#[test]
fn decoding_is_idempotent() {
    let mut stream = build_packet(
        &[(3, b"MISSION01".to_vec()), (13, vec![0x40, 0x00, 0x00, 0x00])],
        true,
    );
    stream.extend_from_slice(&build_packet(&[(65, vec![0x0D])], false));
    let stream = with_sentinel(stream);
    assert_eq!(decode(&stream), decode(&stream));
}

#[test]
fn representative_fields_decode_to_typed_values() {
    let stream = with_sentinel(build_packet(
        &[
            (2, vec![0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x86, 0xA0]),
            (3, Vec::new()),
            (6, vec![0x80, 0x00]),
            (10, b"MQ-9".to_vec()),
            (13, vec![0x40, 0x00, 0x00, 0x00]),
            (15, vec![0xFF, 0xFF]),
            (63, vec![0x03]),
            (77, vec![0x02]),
        ],
        true,
    ));
    let result = decode(&stream);
    assert_eq!(result.packets.len(), 1);
    let packet = &result.packets[0];

    assert_eq!(
        packet.get("Precision Time Stamp"),
        Some(&MisbValue::Float(100.0))
    );
    assert_eq!(packet.get("Mission ID"), Some(&MisbValue::Text(String::new())));
    match packet.get("Platform Pitch Angle") {
        Some(MisbValue::Float(pitch)) => assert!(pitch.is_nan()),
        other => panic!("expected NaN pitch, got {:?}", other),
    }
    assert_eq!(
        packet.get("Platform Designation"),
        Some(&MisbValue::Text("MQ-9".to_owned()))
    );
    assert_eq!(packet.get("Sensor Latitude"), Some(&MisbValue::Float(45.0)));
    match packet.get("Sensor True Altitude") {
        Some(MisbValue::Float(altitude)) => assert!((altitude - 19000.0).abs() < 1e-3),
        other => panic!("expected altitude, got {:?}", other),
    }
    assert_eq!(
        packet.get("Sensor Field of View Name"),
        Some(&MisbValue::Label("Wide"))
    );
    assert_eq!(
        packet.get("Operational Mode"),
        Some(&MisbValue::Label("Training"))
    );
}

#[test]
fn generic_flags_decode_as_named_bits() {
    let stream = with_sentinel(build_packet(&[(47, vec![0xA4])], false));
    let result = decode(&stream);
    let flags = match result.packets[0].get("Generic Flag Data") {
        Some(MisbValue::Flags(flags)) => flags.clone(),
        other => panic!("expected flags, got {:?}", other),
    };
    let expected = [
        ("Laser Range", true),
        ("Auto-Track", false),
        ("IR Polarity (1=black, 0=white)", true),
        ("Icing Detected", false),
        ("Slant Range Measured", false),
        ("Image Invalid", true),
    ];
    assert_eq!(flags.as_slice(), expected);
}

#[test]
fn nested_security_set_decodes_in_item_order() {
    let stream = with_sentinel(build_packet(
        &[(48, vec![0x01, 0x01, 0x02, 0x03, 0x02, 0x55, 0x53])],
        false,
    ));
    let result = decode(&stream);
    assert_eq!(
        result.packets[0].get("Security Local Set"),
        Some(&MisbValue::Set(vec![
            MisbValue::Label("RESTRICTED"),
            MisbValue::Text("US".to_owned()),
        ]))
    );
}

#[test]
fn nested_vmti_set_decodes_in_item_order() {
    let mut vmti = Vec::new();
    vmti.extend_from_slice(&[0x03, 0x07]);
    vmti.extend_from_slice(b"Tracker");
    vmti.extend_from_slice(&[0x05, 0x01, 0x03]);
    vmti.extend_from_slice(&[0x0B, 0x02, 0x12, 0x34]);

    let stream = with_sentinel(build_packet(&[(74, vmti)], false));
    let result = decode(&stream);
    assert_eq!(
        result.packets[0].get("VMTI Local Set"),
        Some(&MisbValue::Set(vec![
            MisbValue::Text("Tracker".to_owned()),
            MisbValue::Unsigned(3),
            MisbValue::Label("IMAPB Required"),
        ]))
    );
}

#[test]
fn unknown_tags_pass_raw_bytes_through() {
    let stream = with_sentinel(build_packet(
        &[(120, vec![0x01, 0x02]), (96, vec![0xAA])],
        false,
    ));
    let result = decode(&stream);
    let packet = &result.packets[0];
    assert_eq!(
        packet.get("Unknown Key 120"),
        Some(&MisbValue::Bytes(vec![0x01, 0x02]))
    );
    /* Tag 96 decodes but has no published name */
    assert_eq!(packet.get("Unknown Key 96"), Some(&MisbValue::Label("IMAPB")));
}

#[test]
fn duplicate_tags_overwrite_in_place() {
    let stream = with_sentinel(build_packet(
        &[(65, vec![0x0C]), (3, b"A".to_vec()), (65, vec![0x0D])],
        false,
    ));
    let result = decode(&stream);
    let packet = &result.packets[0];
    assert_eq!(packet.len(), 2);
    let names: Vec<&str> = packet.fields().map(|(name, _)| name).collect();
    assert_eq!(names, ["UAS Datalink LS Version Number", "Mission ID"]);
    assert_eq!(
        packet.get("UAS Datalink LS Version Number"),
        Some(&MisbValue::Float(13.0))
    );
}

#[test]
fn long_form_ber_packet_length_is_honored() {
    /* Value padded past 127 bytes so the packet length needs the long form */
    let stream = with_sentinel(build_packet(&[(59, vec![0x41; 130])], true));
    let result = decode(&stream);
    assert_eq!(result.packets.len(), 1);
    assert_eq!(
        result.packets[0].get("Platform Call Sign"),
        Some(&MisbValue::Text("A".repeat(130)))
    );
}

fn ts_packet(pid: u16, adaptation: Option<&[u8]>, payload: &[u8]) -> Vec<u8> {
    let mut packet = vec![0x47];
    packet.push(((pid >> 8) & 0x1F) as u8);
    packet.push((pid & 0xFF) as u8);
    match adaptation {
        Some(field) => {
            packet.push(0x30);
            packet.push(field.len() as u8);
            packet.extend_from_slice(field);
        }
        None => packet.push(0x10),
    }
    packet.extend_from_slice(payload);
    assert_eq!(packet.len(), 188);
    packet
}

#[test]
fn demux_filters_pid_and_strips_adaptation_fields() {
    /* Long enough that the KLV stream spans two transport packets */
    let klv = with_sentinel(build_packet(
        &[
            (3, b"MISSION01".to_vec()),
            (59, vec![0x43; 150]),
            (13, vec![0x40, 0x00, 0x00, 0x00]),
        ],
        true,
    ));
    assert!(klv.len() > 184 && klv.len() <= 184 + 173);
    let mut tail = klv[184..].to_vec();
    tail.resize(173, 0x00);

    let mut ts = Vec::new();
    ts.extend_from_slice(&ts_packet(DEFAULT_KLV_PID, None, &klv[..184]));
    /* Foreign PID: excluded */
    ts.extend_from_slice(&ts_packet(0x100, None, &[0xEE; 184]));
    /* Continuation behind an adaptation field */
    ts.extend_from_slice(&ts_packet(DEFAULT_KLV_PID, Some(&[0x00; 10]), &tail));
    /* Bad sync byte: skipped outright */
    let mut bad = ts_packet(DEFAULT_KLV_PID, None, &[0xEE; 184]);
    bad[0] = 0x21;
    ts.extend_from_slice(&bad);
    /* Adaptation field fills the packet: no payload */
    ts.extend_from_slice(&ts_packet(DEFAULT_KLV_PID, Some(&[0x00; 183]), &[]));
    /* Short trailing read terminates cleanly */
    ts.extend_from_slice(&[0x47, 0x01]);

    let stream = TsDemuxer::default().extract(ts.as_slice()).unwrap();
    assert_eq!(stream.len(), 184 + 173);
    assert_eq!(&stream[..klv.len()], klv.as_slice());

    let result = decode(&stream);
    assert_eq!(result.packets.len(), 1);
    assert_eq!(
        result.packets[0].get("Mission ID"),
        Some(&MisbValue::Text("MISSION01".to_owned()))
    );
    assert_eq!(
        result.packets[0].get("Platform Call Sign"),
        Some(&MisbValue::Text("C".repeat(150)))
    );
    assert_eq!(
        result.packets[0].get("Sensor Latitude"),
        Some(&MisbValue::Float(45.0))
    );
}
