//! Fixture builders shared by unit tests.

/// Writes a minimal PE32+ DLL with a single `.edata` section holding the
/// export directory and optional version data blocks.
#[derive(Debug, Default, Clone)]
pub struct PeBuilder {
    exports: Vec<String>,
    version: Option<(String, u32)>,
}

const FILE_SIZE: usize = 0x400;
const PE_OFFSET: usize = 0x80;
const COFF_OFFSET: usize = PE_OFFSET + 4;
const OPTIONAL_OFFSET: usize = COFF_OFFSET + 20;
const OPTIONAL_SIZE: usize = 0xF0;
const SECTION_HEADER_OFFSET: usize = OPTIONAL_OFFSET + OPTIONAL_SIZE;
const SECTION_FILE_OFFSET: usize = 0x200;
const SECTION_RVA: u32 = 0x1000;
const SECTION_SIZE: u32 = 0x200;
/// Function bodies live past the export directory so they are not forwarders.
const FUNCTION_AREA: usize = 0x100;
const DLL_NAME: &[u8] = b"plugin.dll\0";

impl PeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exports(mut self, names: &[&str]) -> Self {
        self.exports = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Place `{ u32 dataVersion = 1; u32 pluginVersion }` at `symbol`'s address.
    pub fn version_data(mut self, symbol: &str, packed: u32) -> Self {
        self.version = Some((symbol.to_string(), packed));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut image = vec![0u8; FILE_SIZE];

        image[0..2].copy_from_slice(b"MZ");
        put_u32(&mut image, 0x3C, PE_OFFSET as u32);
        image[PE_OFFSET..PE_OFFSET + 4].copy_from_slice(b"PE\0\0");

        // COFF header: x86-64, one section, executable DLL.
        put_u16(&mut image, COFF_OFFSET, 0x8664);
        put_u16(&mut image, COFF_OFFSET + 2, 1);
        put_u16(&mut image, COFF_OFFSET + 16, OPTIONAL_SIZE as u16);
        put_u16(&mut image, COFF_OFFSET + 18, 0x2022);

        let opt = OPTIONAL_OFFSET;
        put_u16(&mut image, opt, 0x20B);
        put_u32(&mut image, opt + 20, SECTION_RVA);
        put_u64(&mut image, opt + 24, 0x1_8000_0000);
        put_u32(&mut image, opt + 32, 0x1000);
        put_u32(&mut image, opt + 36, 0x200);
        put_u16(&mut image, opt + 40, 6);
        put_u16(&mut image, opt + 48, 6);
        put_u32(&mut image, opt + 56, 0x2000);
        put_u32(&mut image, opt + 60, SECTION_FILE_OFFSET as u32);
        put_u16(&mut image, opt + 68, 2);
        put_u64(&mut image, opt + 72, 0x10_0000);
        put_u64(&mut image, opt + 80, 0x1000);
        put_u64(&mut image, opt + 88, 0x10_0000);
        put_u64(&mut image, opt + 96, 0x1000);
        put_u32(&mut image, opt + 108, 16);

        let sh = SECTION_HEADER_OFFSET;
        image[sh..sh + 6].copy_from_slice(b".edata");
        put_u32(&mut image, sh + 8, SECTION_SIZE);
        put_u32(&mut image, sh + 12, SECTION_RVA);
        put_u32(&mut image, sh + 16, SECTION_SIZE);
        put_u32(&mut image, sh + 20, SECTION_FILE_OFFSET as u32);
        put_u32(&mut image, sh + 36, 0x4000_0040);

        if !self.exports.is_empty() {
            let export_size = self.write_exports(&mut image);
            put_u32(&mut image, opt + 112, SECTION_RVA);
            put_u32(&mut image, opt + 116, export_size as u32);
        }

        image
    }

    fn write_exports(&self, image: &mut [u8]) -> usize {
        let n = self.exports.len();
        let sec = SECTION_FILE_OFFSET;
        let rva = |offset: usize| SECTION_RVA + offset as u32;

        let address_table = 0x28;
        let name_pointers = address_table + 4 * n;
        let ordinals = name_pointers + 4 * n;
        let dll_name = ordinals + 2 * n;
        image[sec + dll_name..sec + dll_name + DLL_NAME.len()].copy_from_slice(DLL_NAME);
        let mut cursor = dll_name + DLL_NAME.len();

        for (i, name) in self.exports.iter().enumerate() {
            put_u32(image, sec + address_table + 4 * i, rva(FUNCTION_AREA + 0x10 * i));
            put_u32(image, sec + name_pointers + 4 * i, rva(cursor));
            put_u16(image, sec + ordinals + 2 * i, i as u16);
            image[sec + cursor..sec + cursor + name.len()].copy_from_slice(name.as_bytes());
            cursor += name.len() + 1;
        }
        assert!(cursor < FUNCTION_AREA, "export names overflow the fixture layout");

        put_u32(image, sec + 12, rva(dll_name));
        put_u32(image, sec + 16, 1);
        put_u32(image, sec + 20, n as u32);
        put_u32(image, sec + 24, n as u32);
        put_u32(image, sec + 28, rva(address_table));
        put_u32(image, sec + 32, rva(name_pointers));
        put_u32(image, sec + 36, rva(ordinals));

        if let Some((symbol, packed)) = &self.version {
            if let Some(i) = self.exports.iter().position(|e| e == symbol) {
                let data = sec + FUNCTION_AREA + 0x10 * i;
                put_u32(image, data, 1);
                put_u32(image, data + 4, *packed);
            }
        }

        cursor
    }
}

fn put_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_u64(buf: &mut [u8], offset: usize, value: u64) {
    buf[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}
