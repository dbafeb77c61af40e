use super::framer::read_items_lossy;
use super::security::SecurityDecoder;
use super::vmti::VmtiDecoder;
use super::MisbValue;
use enum_dispatch::enum_dispatch;

#[enum_dispatch]
pub(crate) trait LocalSetDecode {
    /// Decodes one short-form tagged item of this Local Set.
    fn decode_item(&self, tag: u8, value: &[u8]) -> MisbValue;
}

#[enum_dispatch(LocalSetDecode)]
pub(crate) enum LocalSetDecoder {
    Security(SecurityDecoder),
    Vmti(VmtiDecoder),
}

/// Walks a nested Local Set value as its own KLV sequence and decodes each item in order.
///
/// Nested checksums are not revalidated; the outer ST 0601 checksum is the sole
/// packet-integrity gate.
pub(crate) fn decode_local_set(data: &[u8], decoder: LocalSetDecoder) -> MisbValue {
    let values = read_items_lossy(data)
        .iter()
        .map(|item| decoder.decode_item(item.tag, item.value))
        .collect();
    MisbValue::Set(values)
}

/// Nested-set text fields strip trailing NUL padding; invalid UTF-8 surfaces the raw bytes.
pub(crate) fn decode_text_stripped(value: &[u8]) -> MisbValue {
    match std::str::from_utf8(value) {
        Ok(text) => MisbValue::Text(text.trim_end_matches('\0').to_owned()),
        Err(_) => MisbValue::Bytes(value.to_vec()),
    }
}
