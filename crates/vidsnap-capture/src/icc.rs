// crates/vidsnap-capture/src/icc.rs
//
// Builds the Display P3 ICC v4 profile embedded into captures of wide-gamut
// sources. Generated in code instead of shipping a binary blob: the profile is
// fully determined by the P3 primaries, the D65 white point adapted to D50 and
// the sRGB transfer curve.
//
// Layout: 128-byte header, tag table, then 4-byte aligned tag data. The three
// TRC tags share one `para` element.

/// D50 PCS illuminant.
const D50: [f64; 3] = [0.9642, 1.0, 0.8249];

/// Display P3 primaries, Bradford-adapted to D50.
const P3_RED:   [f64; 3] = [0.515121, 0.241196, -0.001053];
const P3_GREEN: [f64; 3] = [0.291977, 0.692245,  0.041885];
const P3_BLUE:  [f64; 3] = [0.157104, 0.066574,  0.784073];

/// Bradford chromatic adaptation D65 → D50, row-major.
const CHAD_D65_D50: [f64; 9] = [
     1.047882, 0.022918, -0.050217,
     0.029586, 0.990478, -0.017075,
    -0.009247, 0.015075,  0.751678,
];

/// sRGB piecewise curve as parametric type 3: g, a, b, c, d.
const SRGB_PARA: [f64; 5] = [2.4, 1.0 / 1.055, 0.055 / 1.055, 1.0 / 12.92, 0.04045];

const HEADER_LEN: usize = 128;

/// The complete profile, ready for `ImageEncoder::set_icc_profile`.
pub fn display_p3() -> Vec<u8> {
    let blobs: [Vec<u8>; 8] = [
        mluc("Display P3"),
        mluc("No copyright, use freely"),
        xyz(D50),
        xyz(P3_RED),
        xyz(P3_GREEN),
        xyz(P3_BLUE),
        para(SRGB_PARA),
        sf32(&CHAD_D65_D50),
    ];
    let tags: [(&[u8; 4], usize); 10] = [
        (b"desc", 0), (b"cprt", 1), (b"wtpt", 2),
        (b"rXYZ", 3), (b"gXYZ", 4), (b"bXYZ", 5),
        (b"rTRC", 6), (b"gTRC", 6), (b"bTRC", 6),
        (b"chad", 7),
    ];

    let data_start = HEADER_LEN + 4 + 12 * tags.len();
    let mut data    = Vec::new();
    let mut offsets = Vec::with_capacity(blobs.len());
    for blob in &blobs {
        offsets.push(data_start + data.len());
        data.extend_from_slice(blob);
        while data.len() % 4 != 0 { data.push(0); }
    }
    let total = data_start + data.len();

    let mut out = header(total);
    out.extend_from_slice(&(tags.len() as u32).to_be_bytes());
    for (sig, blob) in tags {
        out.extend_from_slice(sig);
        out.extend_from_slice(&(offsets[blob] as u32).to_be_bytes());
        out.extend_from_slice(&(blobs[blob].len() as u32).to_be_bytes());
    }
    out.extend_from_slice(&data);
    debug_assert_eq!(out.len(), total);
    out
}

fn header(total: usize) -> Vec<u8> {
    let mut h = Vec::with_capacity(HEADER_LEN);
    h.extend_from_slice(&(total as u32).to_be_bytes());
    h.extend_from_slice(&[0; 4]);                       // preferred CMM
    h.extend_from_slice(&0x0430_0000u32.to_be_bytes()); // v4.3
    h.extend_from_slice(b"mntr");
    h.extend_from_slice(b"RGB ");
    h.extend_from_slice(b"XYZ ");
    for v in [2024u16, 1, 1, 0, 0, 0] {
        h.extend_from_slice(&v.to_be_bytes());
    }
    h.extend_from_slice(b"acsp");
    h.extend_from_slice(&[0; 4]);                       // platform
    h.extend_from_slice(&[0; 4]);                       // flags
    h.extend_from_slice(&[0; 8]);                       // manufacturer + model
    h.extend_from_slice(&[0; 8]);                       // attributes
    h.extend_from_slice(&0u32.to_be_bytes());           // perceptual intent
    for v in D50 {
        h.extend_from_slice(&s15f16(v));
    }
    h.extend_from_slice(&[0; 4]);                       // creator
    h.extend_from_slice(&[0; 16]);                      // profile ID
    h.resize(HEADER_LEN, 0);
    h
}

fn s15f16(v: f64) -> [u8; 4] {
    ((v * 65536.0).round() as i32).to_be_bytes()
}

fn mluc(text: &str) -> Vec<u8> {
    let utf16: Vec<u8> = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
    let mut b = Vec::with_capacity(28 + utf16.len());
    b.extend_from_slice(b"mluc");
    b.extend_from_slice(&[0; 4]);
    b.extend_from_slice(&1u32.to_be_bytes());  // one record
    b.extend_from_slice(&12u32.to_be_bytes()); // record size
    b.extend_from_slice(b"enUS");
    b.extend_from_slice(&(utf16.len() as u32).to_be_bytes());
    b.extend_from_slice(&28u32.to_be_bytes()); // string offset from tag start
    b.extend_from_slice(&utf16);
    b
}

fn xyz(v: [f64; 3]) -> Vec<u8> {
    let mut b = Vec::with_capacity(20);
    b.extend_from_slice(b"XYZ ");
    b.extend_from_slice(&[0; 4]);
    for c in v {
        b.extend_from_slice(&s15f16(c));
    }
    b
}

fn para(params: [f64; 5]) -> Vec<u8> {
    let mut b = Vec::with_capacity(32);
    b.extend_from_slice(b"para");
    b.extend_from_slice(&[0; 4]);
    b.extend_from_slice(&3u16.to_be_bytes());
    b.extend_from_slice(&[0; 2]);
    for p in params {
        b.extend_from_slice(&s15f16(p));
    }
    b
}

fn sf32(m: &[f64; 9]) -> Vec<u8> {
    let mut b = Vec::with_capacity(44);
    b.extend_from_slice(b"sf32");
    b.extend_from_slice(&[0; 4]);
    for v in m {
        b.extend_from_slice(&s15f16(*v));
    }
    b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn be32(b: &[u8], at: usize) -> usize {
        u32::from_be_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]]) as usize
    }

    #[test]
    fn header_declares_its_own_size() {
        let p = display_p3();
        assert_eq!(be32(&p, 0), p.len());
        assert_eq!(&p[36..40], b"acsp");
        assert_eq!(&p[12..20], b"mntrRGB ");
    }

    #[test]
    fn tag_table_points_inside_the_profile() {
        let p = display_p3();
        let count = be32(&p, HEADER_LEN);
        assert_eq!(count, 10);
        for i in 0..count {
            let entry  = HEADER_LEN + 4 + i * 12;
            let offset = be32(&p, entry + 4);
            let size   = be32(&p, entry + 8);
            assert_eq!(offset % 4, 0);
            assert!(offset + size <= p.len());
        }
    }

    #[test]
    fn fixed_point_encoding() {
        assert_eq!(s15f16(1.0), [0x00, 0x01, 0x00, 0x00]);
        assert_eq!(s15f16(-1.0), [0xFF, 0xFF, 0x00, 0x00]);
    }
}
