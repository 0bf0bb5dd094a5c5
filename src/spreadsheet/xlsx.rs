use crate::error::ResultMessage;
use crate::error::TimetableError;
use crate::helpers::reader::UnifiedReader;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::cell::NumberFormat;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::BlankStyle;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::style::Borders;
use crate::spreadsheet::style::ColorSpec;
use crate::spreadsheet::style::FillSpec;
use crate::spreadsheet::style::Palette;
use crate::spreadsheet::style::NO_FILL;
use crate::spreadsheet::style::THEME_SLOTS;
use crate::spreadsheet::SpreadsheetError;
use log::debug;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufRead;
use zip::ZipArchive;

// XML tag names for parsing the workbook and worksheet parts
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr"); // Workbook properties
const TAG_SHEET: QName = QName(b"sheet");             // Worksheet definition
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");       // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                  // Text content within strings
const TAG_COLUMN: QName = QName(b"col");              // Column defaults in <cols>
const TAG_ROW: QName = QName(b"row");                 // Row in worksheet
const TAG_CELL: QName = QName(b"c");                  // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");        // Inline string value
const TAG_VALUE: QName = QName(b"v");                 // Cell value content

// XML tag names for parsing styles.xml
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts");  // Custom number formats container
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");    // Individual custom number format
const TAG_FILLS: QName = QName(b"fills");             // Fill definitions container
const TAG_FILL: QName = QName(b"fill");               // Individual fill
const TAG_PATTERN_FILL: QName = QName(b"patternFill"); // Pattern (solid) fill
const TAG_GRADIENT_FILL: QName = QName(b"gradientFill"); // Gradient fill
const TAG_FOREGROUND_COLOR: QName = QName(b"fgColor"); // Pattern foreground color
const TAG_BORDERS: QName = QName(b"borders");         // Border definitions container
const TAG_BORDER: QName = QName(b"border");           // Individual border
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");  // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");         // Individual cell format index
const TAG_INDEXED_COLORS: QName = QName(b"indexedColors"); // Custom legacy palette
const TAG_RGB_COLOR: QName = QName(b"rgbColor");      // Legacy palette entry

// Local names inside theme1.xml (prefixed with `a:`)
const TAG_COLOR_SCHEME: &[u8] = b"clrScheme";
const TAG_SRGB_COLOR: &[u8] = b"srgbClr";
const TAG_SYSTEM_COLOR: &[u8] = b"sysClr";

/// The parts of a cell format the timetable reader cares about
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct CellStyle {
    pub(crate) number_format: NumberFormat,
    /// Resolved fill color
    pub(crate) fill: String,
    pub(crate) border: Borders,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            number_format: NumberFormat::default(),
            fill: NO_FILL.to_owned(),
            border: Borders::none(),
        }
    }
}

/// How the raw text of a `<c>` element is to be decoded
#[derive(Copy, Clone, Debug, Default, PartialEq)]
enum ValueKind {
    #[default]
    Number,
    SharedString,
    InlineString,
    Boolean,
    Error,
    IsoDateTime,
}

/// Represents an opened XLSX workbook
pub(crate) struct XlsxWorkbook {
    /// File name (or a label for in-memory workbooks)
    pub(crate) name: String,
    /// ZIP archive containing the XLSX file contents
    zip: ZipArchive<UnifiedReader>,
    /// List of worksheets with (name, zip_path) pairs
    sheets: Vec<(String, String)>,
    /// Whether serial dates count from 1904
    is_1904: bool,
    /// Cell formats indexed by the `s` attribute of cells
    styles: Vec<CellStyle>,
    shared_strings: Vec<String>,
}

impl XlsxWorkbook {
    /// Opens an XLSX package and parses everything a worksheet read depends on:
    /// workbook structure, theme colors, styles and shared strings.
    pub(crate) fn open(name: &str, reader: UnifiedReader) -> Result<XlsxWorkbook, TimetableError> {
        let mut zip = ZipArchive::new(reader)?;
        let (sheets, is_1904) = load_workbook(&mut zip)?;
        if sheets.is_empty() {
            Err(SpreadsheetError::SpreadsheetEmptyError(name.to_owned()))?
        }
        let scheme = load_theme(&mut zip).with_prefix("theme")?;
        let styles = load_styles(&mut zip, scheme).with_prefix("xl/styles.xml")?;
        let shared_strings = load_shared_strings(&mut zip).with_prefix("xl/sharedStrings.xml")?;
        debug!(
            "Opened workbook '{}': {} sheet(s), {} cell format(s), {} shared string(s)",
            name,
            sheets.len(),
            styles.len(),
            shared_strings.len()
        );
        Ok(XlsxWorkbook {
            name: name.to_owned(),
            zip,
            sheets,
            is_1904,
            styles,
            shared_strings,
        })
    }

    /// Worksheet names in workbook order
    pub(crate) fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.to_owned()).collect()
    }

    /// Decodes one worksheet into a dense [`Sheet`], `None` when no sheet has that name
    pub(crate) fn read_sheet(&mut self, sheet_name: &str) -> Result<Option<Sheet>, TimetableError> {
        let Some(zip_path) = self.sheets
            .iter()
            .find(|(name, _)| name == sheet_name)
            .map(|(_, path)| path.to_owned())
        else {
            return Ok(None);
        };

        let mut reader = self.zip.xml_reader(&zip_path)?
            .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
        let mut cells = Vec::<Cell>::new();
        let mut column_styles = Vec::<(usize, usize, usize)>::new();
        let mut row_styles = HashMap::<usize, usize>::new();
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut style = 0usize;
        let mut kind = ValueKind::default();
        let mut value = String::new();
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_COLUMN => {
                let min = event.parse_attribute_value::<usize>("min")?;
                let max = event.parse_attribute_value::<usize>("max")?;
                let column_style = event.parse_attribute_value::<usize>("style")?;
                if let (Some(min), Some(max), Some(column_style)) = (min, max, column_style) {
                    column_styles.push((min, max, column_style));
                }
            }
            Event::Start(event) if event.name() == TAG_ROW => {
                row_count = event.parse_attribute_value::<usize>("r")?.unwrap_or(row_count + 1);
                col_count = 0;
                if event.get_flag("customFormat")? {
                    if let Some(row_style) = event.parse_attribute_value::<usize>("s")? {
                        row_styles.insert(row_count, row_style);
                    }
                }
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = event.get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((row_count, col_count + 1));
                col_count = col;
                style = event.parse_attribute_value::<usize>("s")?.unwrap_or(0);
                kind = event.get_attribute_value("t")?.map(|t| {
                    match t.as_ref() {
                        "s" => ValueKind::SharedString,
                        "inlineStr" | "str" => ValueKind::InlineString,
                        "b" => ValueKind::Boolean,
                        "e" => ValueKind::Error,
                        "d" => ValueKind::IsoDateTime,
                        _ => ValueKind::Number,
                    }
                }).unwrap_or_default();
                value.clear();
            }
            Event::Start(event) if event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if event.name() == TAG_CELL => {
                let cell_style = self.styles.get(style).cloned().unwrap_or_default();
                let cell_value = decode_value(kind, &value, cell_style.number_format, self.is_1904, &self.shared_strings)?;
                cells.push(Cell {
                    row,
                    col,
                    value: cell_value,
                    fill: cell_style.fill,
                    border: cell_style.border,
                });
                value.clear();
            }
        });

        let blank_style = |index: usize| {
            let style = self.styles.get(index).cloned().unwrap_or_default();
            BlankStyle { fill: style.fill, border: style.border }
        };
        let row_styles = row_styles
            .into_iter()
            .map(|(row, index)| (row, blank_style(index)))
            .collect();
        let column_styles = column_styles
            .into_iter()
            .map(|(min, max, index)| (min, max, blank_style(index)))
            .collect();
        let sheet = Sheet::with_cells(sheet_name, cells).with_default_styles(row_styles, column_styles);
        debug!("Read sheet '{}' ({} x {})", sheet_name, sheet.max_row(), sheet.max_col());
        Ok(Some(sheet))
    }
}

/// Decodes the raw text of a cell according to its type attribute and number format
fn decode_value(
    kind: ValueKind,
    raw: &str,
    number_format: NumberFormat,
    is_1904: bool,
    shared_strings: &[String],
) -> Result<CellValue, TimetableError> {
    if raw.is_empty() {
        return Ok(CellValue::Empty);
    }
    let value = match kind {
        ValueKind::SharedString => {
            let index = raw.trim().parse::<usize>()?;
            shared_strings
                .get(index)
                .map(|text| CellValue::Text(text.to_owned()))
                .unwrap_or_default()
        }
        ValueKind::InlineString | ValueKind::Error => CellValue::Text(raw.to_owned()),
        ValueKind::Boolean => CellValue::Boolean(matches!(raw.trim(), "1" | "true")),
        ValueKind::IsoDateTime => CellValue::from_iso(raw.trim())
            .unwrap_or_else(|_| CellValue::Text(raw.to_owned())),
        ValueKind::Number => {
            let number = raw.trim().parse::<f64>()?;
            CellValue::from_serial(number, number_format, is_1904)
        }
    };
    Ok(value)
}

/// Loads workbook structure and worksheet information
///
/// # Returns
/// Tuple of (worksheets, is_1904_date_system) where worksheets are (name, zip_path) pairs
fn load_workbook(zip: &mut ZipArchive<UnifiedReader>) -> Result<(Vec<(String, String)>, bool), TimetableError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels", "worksheet")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::FileError("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(id.as_ref()) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.get_flag("date1904")?;
        }
    });
    Ok((sheets, is_1904))
}

/// Loads the theme color scheme, in file order (dk1, lt1, dk2, lt2, accents, links)
///
/// Workbooks without a theme part get an empty scheme; theme colors then resolve to nothing.
fn load_theme(zip: &mut ZipArchive<UnifiedReader>) -> Result<Vec<Option<String>>, TimetableError> {
    let path = load_relationships(zip, "xl/_rels/workbook.xml.rels", "theme")?
        .into_values()
        .next()
        .unwrap_or_else(|| "xl/theme/theme1.xml".to_owned());
    let mut scheme = vec![None::<String>; THEME_SLOTS.len()];
    let mut reader = match zip.xml_reader(&path)? {
        Some(reader) => reader,
        None => return Ok(scheme),
    };

    let mut scheme_context = false;
    let mut slot = None::<usize>;
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_COLOR_SCHEME => scheme_context = true,
        Event::End(event) if event.local_name().as_ref() == TAG_COLOR_SCHEME => break,
        Event::Start(event) if scheme_context && slot.is_none() => {
            slot = THEME_SLOTS.iter().position(|name| name.as_bytes() == event.local_name().as_ref());
        }
        Event::Start(event) if event.local_name().as_ref() == TAG_SRGB_COLOR => {
            if let Some(index) = slot {
                scheme[index] = event.get_attribute_value("val")?.map(|value| value.to_string());
            }
        }
        Event::Start(event) if event.local_name().as_ref() == TAG_SYSTEM_COLOR => {
            if let Some(index) = slot {
                scheme[index] = event.get_attribute_value("lastClr")?.map(|value| value.to_string());
            }
        }
        Event::End(event) if slot.map(|index| THEME_SLOTS[index].as_bytes() == event.local_name().as_ref()).unwrap_or(false) => {
            slot = None;
        }
    });
    Ok(scheme)
}

/// Reads a `CT_Color` element (`rgb`, `theme` + `tint` or `indexed`)
fn parse_color(event: &BytesStart<'_>) -> Result<ColorSpec, TimetableError> {
    if let Some(rgb) = event.get_attribute_value("rgb")? {
        return Ok(ColorSpec::Rgb(rgb.to_string()));
    }
    if let Some(index) = event.parse_attribute_value::<usize>("theme")? {
        let tint = event.parse_attribute_value::<f64>("tint")?.unwrap_or(0.0);
        return Ok(ColorSpec::Theme { index, tint });
    }
    if let Some(index) = event.parse_attribute_value::<usize>("indexed")? {
        return Ok(ColorSpec::Indexed(index));
    }
    Ok(ColorSpec::Auto)
}

/// Loads number formats, fills, borders and cell formats from styles.xml
///
/// Fill colors are resolved against the theme scheme and the (possibly customised)
/// legacy palette once the whole part has been read.
///
/// # Returns
/// Vector of CellStyle values indexed by style ID
fn load_styles(zip: &mut ZipArchive<UnifiedReader>, scheme: Vec<Option<String>>) -> Result<Vec<CellStyle>, TimetableError> {
    let mut reader = match zip.xml_reader("xl/styles.xml")? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, NumberFormat>::new();

    let mut fills_context = false;
    let mut pattern_context = false;
    let mut fill = None::<FillSpec>;
    let mut fills = Vec::<FillSpec>::new();

    let mut borders_context = false;
    let mut border = None::<Borders>;
    let mut borders = Vec::<Borders>::new();

    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<(String, usize, usize)>::new();

    let mut indexed_colors_context = false;
    let mut indexed_colors = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = true,
        Event::End(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = false,
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                custom_formats.insert(id.to_string(), NumberFormat::parse_custom_number_format(&format));
            }
        }

        Event::Start(event) if event.name() == TAG_FILLS => fills_context = true,
        Event::End(event) if event.name() == TAG_FILLS => fills_context = false,
        Event::Start(event) if fills_context && event.name() == TAG_FILL => fill = Some(FillSpec::None),
        Event::Start(event) if fill.is_some() && event.name() == TAG_PATTERN_FILL => {
            let pattern = event.get_attribute_value("patternType")?;
            if pattern.map(|pattern| pattern != "none").unwrap_or(false) {
                pattern_context = true;
                fill = Some(FillSpec::Pattern(ColorSpec::Auto));
            }
        }
        Event::Start(event) if pattern_context && event.name() == TAG_FOREGROUND_COLOR => {
            fill = Some(FillSpec::Pattern(parse_color(&event)?));
        }
        Event::Start(event) if fill.is_some() && event.name() == TAG_GRADIENT_FILL => fill = Some(FillSpec::Unsupported),
        Event::End(event) if fills_context && event.name() == TAG_FILL => {
            fills.push(fill.take().unwrap_or_default());
            pattern_context = false;
        }

        Event::Start(event) if event.name() == TAG_BORDERS => borders_context = true,
        Event::End(event) if event.name() == TAG_BORDERS => borders_context = false,
        Event::Start(event) if borders_context && event.name() == TAG_BORDER => border = Some(Borders::none()),
        Event::Start(event) if border.is_some() && is_border_edge(&event) => {
            let visible = event.get_attribute_value("style")?
                .map(|style| style != "none")
                .unwrap_or(false);
            if let Some(edges) = border.as_mut() {
                match event.name().as_ref() {
                    b"top" => edges.top = visible,
                    b"bottom" => edges.bottom = visible,
                    b"left" | b"start" => edges.left = visible,
                    b"right" | b"end" => edges.right = visible,
                    _ => (),
                }
            }
        }
        Event::End(event) if borders_context && event.name() == TAG_BORDER => {
            borders.push(border.take().unwrap_or_default());
        }

        Event::Start(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = true,
        Event::End(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = false,
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            let number_format = event.get_attribute_value("numFmtId")?.map(|id| id.to_string()).unwrap_or_default();
            let fill_id = event.parse_attribute_value::<usize>("fillId")?.unwrap_or(0);
            let border_id = event.parse_attribute_value::<usize>("borderId")?.unwrap_or(0);
            format_indexes.push((number_format, fill_id, border_id));
        }

        Event::Start(event) if event.name() == TAG_INDEXED_COLORS => indexed_colors_context = true,
        Event::End(event) if event.name() == TAG_INDEXED_COLORS => indexed_colors_context = false,
        Event::Start(event) if indexed_colors_context && event.name() == TAG_RGB_COLOR => {
            indexed_colors.push(event.get_attribute_value("rgb")?.map(|rgb| rgb.to_string()).unwrap_or_default());
        }
    });

    let palette = Palette::new(scheme, indexed_colors);
    let styles = format_indexes
        .into_iter()
        .map(|(number_format, fill_id, border_id)| CellStyle {
            number_format: custom_formats
                .get(&number_format)
                .copied()
                .or_else(|| NumberFormat::parse_builtin_number_format_id(&number_format))
                .unwrap_or_default(),
            fill: fills
                .get(fill_id)
                .map(|fill| palette.resolve_fill(fill))
                .unwrap_or_else(|| NO_FILL.to_owned()),
            border: borders.get(border_id).copied().unwrap_or_default(),
        })
        .collect();
    Ok(styles)
}

fn is_border_edge(event: &BytesStart<'_>) -> bool {
    matches!(event.name().as_ref(), b"top" | b"bottom" | b"left" | b"right" | b"start" | b"end")
}

/// Loads the whole shared string table
fn load_shared_strings(zip: &mut ZipArchive<UnifiedReader>) -> Result<Vec<String>, TimetableError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.xml_reader("xl/sharedStrings.xml")? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            shared_strings.push(read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?);
        }
    });
    Ok(shared_strings)
}

/// Reads string value from XML content, handling text and CDATA sections
///
/// Rich text runs are concatenated; phonetic annotations are skipped.
///
/// # Arguments
/// * `reader` - XML reader positioned at the start of the string content
/// * `end_tag` - XML tag that marks the end of the string content
/// * `is_text_content` - Whether to treat the content as text by default
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, TimetableError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}
