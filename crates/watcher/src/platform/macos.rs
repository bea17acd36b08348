//! `NSPasteboard` adapter.

use crate::pasteboard::{ImageData, ImageFormat, Pasteboard, PasteboardError, Result};
use std::ffi::{CStr, CString};

use objc::rc::autoreleasepool;
use objc::runtime::{Class, Object, BOOL, NO};
use objc::{msg_send, sel, sel_impl};

const UTI_PLAIN_TEXT: &str = "public.utf8-plain-text";

/// Image types tried in order of preference.
const IMAGE_TYPES: [(&str, ImageFormat); 2] = [
    ("public.png", ImageFormat::Png),
    ("public.tiff", ImageFormat::Tiff),
];

/// The general pasteboard.
///
/// Holds no Cocoa objects between calls; every access looks up
/// `generalPasteboard` inside its own autorelease pool.
#[derive(Debug, Default)]
pub struct MacPasteboard;

impl MacPasteboard {
    pub fn new() -> Self {
        Self
    }
}

unsafe fn general_pasteboard() -> Option<*mut Object> {
    let class = Class::get("NSPasteboard")?;
    let pasteboard: *mut Object = msg_send![class, generalPasteboard];
    (!pasteboard.is_null()).then_some(pasteboard)
}

/// Autoreleased NSString from a Rust string.
unsafe fn ns_string(value: &str) -> Option<*mut Object> {
    let c_string = CString::new(value).ok()?;
    let class = Class::get("NSString")?;
    let string: *mut Object = msg_send![class, stringWithUTF8String: c_string.as_ptr()];
    (!string.is_null()).then_some(string)
}

unsafe fn nsstring_to_string(nsstring: *mut Object) -> Option<String> {
    if nsstring.is_null() {
        return None;
    }
    let c_str: *const std::os::raw::c_char = msg_send![nsstring, UTF8String];
    if c_str.is_null() {
        return None;
    }
    Some(CStr::from_ptr(c_str).to_string_lossy().into_owned())
}

unsafe fn nsdata_to_vec(data: *mut Object) -> Option<Vec<u8>> {
    if data.is_null() {
        return None;
    }
    let length: usize = msg_send![data, length];
    let bytes: *const u8 = msg_send![data, bytes];
    if bytes.is_null() || length == 0 {
        return None;
    }
    Some(std::slice::from_raw_parts(bytes, length).to_vec())
}

/// Clear the pasteboard so a write replaces every representation.
unsafe fn cleared_pasteboard() -> Result<*mut Object> {
    let pasteboard = general_pasteboard().ok_or(PasteboardError::Unavailable)?;
    let _: isize = msg_send![pasteboard, clearContents];
    Ok(pasteboard)
}

impl Pasteboard for MacPasteboard {
    fn change_count(&mut self) -> i64 {
        autoreleasepool(|| unsafe {
            match general_pasteboard() {
                Some(pasteboard) => {
                    let count: isize = msg_send![pasteboard, changeCount];
                    count as i64
                }
                None => 0,
            }
        })
    }

    fn read_text(&mut self) -> Option<String> {
        autoreleasepool(|| unsafe {
            let pasteboard = general_pasteboard()?;
            let ty = ns_string(UTI_PLAIN_TEXT)?;
            let string: *mut Object = msg_send![pasteboard, stringForType: ty];
            nsstring_to_string(string)
        })
    }

    fn read_image(&mut self) -> Option<ImageData> {
        autoreleasepool(|| unsafe {
            let pasteboard = general_pasteboard()?;
            IMAGE_TYPES.iter().find_map(|(uti, format)| {
                let ty = ns_string(uti)?;
                let data: *mut Object = msg_send![pasteboard, dataForType: ty];
                nsdata_to_vec(data).map(|bytes| ImageData {
                    bytes,
                    format: *format,
                })
            })
        })
    }

    fn read_file_paths(&mut self) -> Option<Vec<String>> {
        autoreleasepool(|| unsafe {
            let pasteboard = general_pasteboard()?;
            let url_class = Class::get("NSURL")?;
            let array_class = Class::get("NSArray")?;

            let classes: *mut Object = msg_send![array_class, arrayWithObject: url_class];
            let nil: *mut Object = std::ptr::null_mut();
            let urls: *mut Object = msg_send![pasteboard, readObjectsForClasses: classes options: nil];
            if urls.is_null() {
                return None;
            }

            let count: usize = msg_send![urls, count];
            let mut paths = Vec::with_capacity(count);
            for idx in 0..count {
                let url: *mut Object = msg_send![urls, objectAtIndex: idx];
                if url.is_null() {
                    continue;
                }
                // Web links also read back as NSURL.
                let is_file: BOOL = msg_send![url, isFileURL];
                if is_file == NO {
                    continue;
                }
                let path: *mut Object = msg_send![url, path];
                if let Some(path) = nsstring_to_string(path) {
                    paths.push(path);
                }
            }

            (!paths.is_empty()).then_some(paths)
        })
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        autoreleasepool(|| unsafe {
            let value = ns_string(text)
                .ok_or_else(|| PasteboardError::WriteFailed("text contains NUL".into()))?;
            let ty = ns_string(UTI_PLAIN_TEXT).ok_or(PasteboardError::Unavailable)?;
            let pasteboard = cleared_pasteboard()?;

            let ok: BOOL = msg_send![pasteboard, setString: value forType: ty];
            if ok == NO {
                return Err(PasteboardError::WriteFailed("setString:forType: refused".into()));
            }
            Ok(())
        })
    }

    fn write_image(&mut self, image: &ImageData) -> Result<()> {
        autoreleasepool(|| unsafe {
            let uti = IMAGE_TYPES
                .iter()
                .find(|(_, format)| *format == image.format)
                .map(|(uti, _)| *uti)
                .unwrap_or("public.png");
            let ty = ns_string(uti).ok_or(PasteboardError::Unavailable)?;
            let data_class = Class::get("NSData").ok_or(PasteboardError::Unavailable)?;
            let data: *mut Object = msg_send![data_class, dataWithBytes: image.bytes.as_ptr() length: image.bytes.len()];
            if data.is_null() {
                return Err(PasteboardError::WriteFailed("could not allocate NSData".into()));
            }
            let pasteboard = cleared_pasteboard()?;

            let ok: BOOL = msg_send![pasteboard, setData: data forType: ty];
            if ok == NO {
                return Err(PasteboardError::WriteFailed("setData:forType: refused".into()));
            }
            Ok(())
        })
    }

    fn write_file_paths(&mut self, paths: &[String]) -> Result<()> {
        autoreleasepool(|| unsafe {
            let url_class = Class::get("NSURL").ok_or(PasteboardError::Unavailable)?;
            let array_class = Class::get("NSMutableArray").ok_or(PasteboardError::Unavailable)?;
            let urls: *mut Object = msg_send![array_class, arrayWithCapacity: paths.len()];
            if urls.is_null() {
                return Err(PasteboardError::WriteFailed("could not allocate NSMutableArray".into()));
            }

            for path in paths {
                let ns_path = ns_string(path)
                    .ok_or_else(|| PasteboardError::WriteFailed("path contains NUL".into()))?;
                let url: *mut Object = msg_send![url_class, fileURLWithPath: ns_path];
                if url.is_null() {
                    return Err(PasteboardError::WriteFailed("invalid file path".into()));
                }
                let _: () = msg_send![urls, addObject: url];
            }

            let pasteboard = cleared_pasteboard()?;
            let ok: BOOL = msg_send![pasteboard, writeObjects: urls];
            if ok == NO {
                return Err(PasteboardError::WriteFailed("writeObjects: refused".into()));
            }
            Ok(())
        })
    }
}
