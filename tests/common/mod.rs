#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use byteorder::{NativeEndian, WriteBytesExt};
use elfcut::types::{self, Class};
use elfcut::HeaderField;

/// Builds a synthetic ELF image: a valid header, a non-zero byte pattern
/// everywhere else, and hand placed section header entries.
pub struct Fixture {
    pub class:     Class,
    pub size:      usize,
    pub shoff:     u64,
    pub shnum:     u16,
    pub shentsize: u16,
    pub shstrndx:  u16,
    pub data:      u8,
    entries:       Vec<(u64, u64, u64, u32)>,
}

impl Fixture {
    pub fn elf64(size: usize, shoff: u64, shnum: u16) -> Fixture {
        Fixture::new(Class::Class64, size, shoff, shnum, 64)
    }

    pub fn elf32(size: usize, shoff: u64, shnum: u16) -> Fixture {
        Fixture::new(Class::Class32, size, shoff, shnum, 40)
    }

    fn new(class: Class, size: usize, shoff: u64, shnum: u16, shentsize: u16) -> Fixture {
        Fixture {
            class,
            size,
            shoff,
            shnum,
            shentsize,
            shstrndx: 0,
            data: types::Endianness::host() as u8,
            entries: Vec::new(),
        }
    }

    pub fn shentsize(mut self, v: u16) -> Fixture {
        self.shentsize = v;
        self
    }

    pub fn shstrndx(mut self, v: u16) -> Fixture {
        self.shstrndx = v;
        self
    }

    pub fn byte_order(mut self, v: u8) -> Fixture {
        self.data = v;
        self
    }

    /// section header `index` describing data at `offset..offset+size`
    pub fn section(mut self, index: u64, offset: u64, size: u64) -> Fixture {
        self.entries.push((index, offset, size, 0));
        self
    }

    pub fn section_link(mut self, index: u64, link: u32) -> Fixture {
        self.entries.push((index, 0, 0, link));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut b: Vec<u8> = (0..self.size).map(|i| (i % 251) as u8 | 1).collect();
        let ehsize = self.class.ehsize().min(self.size);
        for x in &mut b[..ehsize] {
            *x = 0;
        }
        b[..4].copy_from_slice(&types::MAGIC);
        b[types::EI_CLASS] = self.class as u8;
        b[types::EI_DATA] = self.data;
        b[6] = 1;

        put(&mut b, HeaderField::Shoff.span(self.class).start, self.class.uclass_width(), self.shoff);
        put(&mut b, HeaderField::Shentsize.span(self.class).start, 2, self.shentsize as u64);
        put(&mut b, HeaderField::Shnum.span(self.class).start, 2, self.shnum as u64);
        put(&mut b, HeaderField::Shstrndx.span(self.class).start, 2, self.shstrndx as u64);

        let (off_at, size_at, link_at) = match self.class {
            Class::Class32 => (16, 20, 24),
            Class::Class64 => (24, 32, 40),
        };
        let w = self.class.uclass_width();
        for &(index, offset, size, link) in &self.entries {
            let base = (self.shoff + index * self.shentsize as u64) as usize;
            if base + self.shentsize as usize > b.len() {
                continue;
            }
            for x in &mut b[base..base + self.shentsize as usize] {
                *x = 0;
            }
            put(&mut b, base + off_at, w, offset);
            put(&mut b, base + size_at, w, size);
            put(&mut b, base + link_at, 4, link as u64);
        }
        b
    }

    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, self.build()).unwrap();
        path
    }
}

fn put(b: &mut [u8], at: usize, width: usize, v: u64) {
    let mut w = &mut b[at..at + width];
    match width {
        2 => w.write_u16::<NativeEndian>(v as u16).unwrap(),
        4 => w.write_u32::<NativeEndian>(v as u32).unwrap(),
        _ => w.write_u64::<NativeEndian>(v).unwrap(),
    }
}

/// true if `b` lies inside one of the cleared header fields
pub fn in_cleared_field(class: Class, at: usize) -> bool {
    HeaderField::ALL.iter().any(|f| f.span(class).contains(&at))
}

/// `out` equals `input[..out.len()]`, except for the cleared header fields
/// and `zeroed`, which must read as 0
pub fn assert_prefix(class: Class, input: &[u8], out: &[u8], zeroed: Option<(usize, usize)>) {
    assert!(out.len() <= input.len());
    for (i, (&a, &b)) in input.iter().zip(out.iter()).enumerate() {
        let z = zeroed.map(|(s, e)| i >= s && i < e).unwrap_or(false);
        if z || in_cleared_field(class, i) {
            assert_eq!(b, 0, "byte {:#x} should be zero", i);
        } else {
            assert_eq!(a, b, "byte {:#x} changed", i);
        }
    }
}
