#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::io::Cursor;
use std::io::Write;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Formatting of one cell in a fixture workbook
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    /// Attributes of the solid fill's `<fgColor>`, e.g. `rgb="FF92D050"`
    pub fill: Option<String>,
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
    pub date: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    Inline(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
}

#[derive(Default)]
struct SheetData {
    cells: BTreeMap<(usize, usize), (Option<Value>, Style)>,
    columns: Vec<(usize, usize, Style)>,
    rows: BTreeMap<usize, Style>,
}

/// Writes small XLSX packages in memory
pub struct WorkbookBuilder {
    sheets: Vec<(String, SheetData)>,
    current: usize,
}

impl WorkbookBuilder {
    pub fn new(sheet: &str) -> Self {
        Self { sheets: vec![(sheet.to_owned(), SheetData::default())], current: 0 }
    }

    pub fn add_sheet(&mut self, name: &str) -> &mut Self {
        self.sheets.push((name.to_owned(), SheetData::default()));
        self.current = self.sheets.len() - 1;
        self
    }

    fn cell(&mut self, row: usize, col: usize) -> &mut (Option<Value>, Style) {
        self.sheets[self.current].1.cells.entry((row, col)).or_default()
    }

    pub fn value(&mut self, row: usize, col: usize, value: Value) -> &mut Self {
        self.cell(row, col).0 = Some(value);
        self
    }

    pub fn text(&mut self, row: usize, col: usize, text: &str) -> &mut Self {
        self.value(row, col, Value::Text(text.to_owned()))
    }

    pub fn date(&mut self, row: usize, col: usize, date: NaiveDate) -> &mut Self {
        let cell = self.cell(row, col);
        cell.0 = Some(Value::Date(date));
        cell.1.date = true;
        self
    }

    pub fn fill(&mut self, top: usize, left: usize, bottom: usize, right: usize, fill: &str) -> &mut Self {
        for row in top..=bottom {
            for col in left..=right {
                self.cell(row, col).1.fill = Some(fill.to_owned());
            }
        }
        self
    }

    /// Draws a thin box around the rectangle
    pub fn outline(&mut self, top: usize, left: usize, bottom: usize, right: usize) -> &mut Self {
        for col in left..=right {
            self.cell(top, col).1.top = true;
            self.cell(bottom, col).1.bottom = true;
        }
        for row in top..=bottom {
            self.cell(row, left).1.left = true;
            self.cell(row, right).1.right = true;
        }
        self
    }

    pub fn bottom_border(&mut self, row: usize, col: usize) -> &mut Self {
        self.cell(row, col).1.bottom = true;
        self
    }

    pub fn column_style(&mut self, min: usize, max: usize, style: Style) -> &mut Self {
        self.sheets[self.current].1.columns.push((min, max, style));
        self
    }

    pub fn row_style(&mut self, row: usize, style: Style) -> &mut Self {
        self.sheets[self.current].1.rows.insert(row, style);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut styles = vec![Style::default()];
        let mut strings = Vec::<String>::new();
        let mut sheet_parts = Vec::new();
        for (_, data) in &self.sheets {
            sheet_parts.push(sheet_xml(data, &mut styles, &mut strings));
        }

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        let mut put = |name: &str, content: &str| {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        };
        put("[Content_Types].xml", CONTENT_TYPES);
        put("_rels/.rels", ROOT_RELS);
        put("xl/workbook.xml", &self.workbook_xml());
        put("xl/_rels/workbook.xml.rels", &self.workbook_rels());
        put("xl/theme/theme1.xml", THEME);
        put("xl/styles.xml", &styles_xml(&styles));
        put("xl/sharedStrings.xml", &shared_strings_xml(&strings));
        for (index, part) in sheet_parts.iter().enumerate() {
            put(&format!("xl/worksheets/sheet{}.xml", index + 1), part);
        }
        zip.finish().unwrap().into_inner()
    }

    fn workbook_xml(&self) -> String {
        let sheets: String = self.sheets
            .iter()
            .enumerate()
            .map(|(index, (name, _))| format!(r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#, escape(name), index + 1, index + 1))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><workbookPr/><sheets>{sheets}</sheets></workbook>"#
        )
    }

    fn workbook_rels(&self) -> String {
        let sheets: String = (1..=self.sheets.len())
            .map(|index| format!(
                r#"<Relationship Id="rId{index}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{index}.xml"/>"#
            ))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{sheets}<Relationship Id="rId100" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/><Relationship Id="rId101" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId102" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/></Relationships>"#
        )
    }
}

fn style_index(styles: &mut Vec<Style>, style: &Style) -> usize {
    match styles.iter().position(|known| known == style) {
        Some(index) => index,
        None => {
            styles.push(style.clone());
            styles.len() - 1
        }
    }
}

fn sheet_xml(data: &SheetData, styles: &mut Vec<Style>, strings: &mut Vec<String>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );
    if !data.columns.is_empty() {
        xml.push_str("<cols>");
        for (min, max, style) in &data.columns {
            let index = style_index(styles, style);
            xml.push_str(&format!(r#"<col min="{min}" max="{max}" width="9" style="{index}" customWidth="1"/>"#));
        }
        xml.push_str("</cols>");
    }
    xml.push_str("<sheetData>");
    let rows: BTreeSet<usize> = data.cells.keys().map(|(row, _)| *row).chain(data.rows.keys().copied()).collect();
    for row in rows {
        match data.rows.get(&row) {
            Some(style) => {
                let index = style_index(styles, style);
                xml.push_str(&format!(r#"<row r="{row}" s="{index}" customFormat="1">"#));
            }
            None => xml.push_str(&format!(r#"<row r="{row}">"#)),
        }
        for ((_, col), (value, style)) in data.cells.range((row, 0)..(row + 1, 0)) {
            let reference = format!("{}{}", column_name(*col), row);
            let index = style_index(styles, style);
            let style_attribute = if index == 0 { String::new() } else { format!(r#" s="{index}""#) };
            match value {
                None => xml.push_str(&format!(r#"<c r="{reference}"{style_attribute}/>"#)),
                Some(Value::Text(text)) => {
                    let position = match strings.iter().position(|known| known == text) {
                        Some(position) => position,
                        None => {
                            strings.push(text.to_owned());
                            strings.len() - 1
                        }
                    };
                    xml.push_str(&format!(r#"<c r="{reference}"{style_attribute} t="s"><v>{position}</v></c>"#));
                }
                Some(Value::Inline(text)) => xml.push_str(&format!(
                    r#"<c r="{reference}"{style_attribute} t="inlineStr"><is><t>{}</t></is></c>"#,
                    escape(text)
                )),
                Some(Value::Number(number)) => {
                    xml.push_str(&format!(r#"<c r="{reference}"{style_attribute}><v>{number}</v></c>"#))
                }
                Some(Value::Date(date)) => {
                    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap();
                    let serial = date.signed_duration_since(epoch).num_days();
                    xml.push_str(&format!(r#"<c r="{reference}"{style_attribute}><v>{serial}</v></c>"#));
                }
                Some(Value::Bool(value)) => xml.push_str(&format!(
                    r#"<c r="{reference}"{style_attribute} t="b"><v>{}</v></c>"#,
                    if *value { 1 } else { 0 }
                )),
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn styles_xml(styles: &[Style]) -> String {
    let mut fills = vec![
        r#"<fill><patternFill patternType="none"/></fill>"#.to_owned(),
        r#"<fill><patternFill patternType="gray125"/></fill>"#.to_owned(),
    ];
    let mut borders = vec![(false, false, false, false)];
    let mut xfs = String::new();
    for style in styles {
        let fill_id = match &style.fill {
            None => 0,
            Some(color) => {
                let xml = format!(r#"<fill><patternFill patternType="solid"><fgColor {color}/><bgColor indexed="64"/></patternFill></fill>"#);
                match fills.iter().position(|known| *known == xml) {
                    Some(index) => index,
                    None => {
                        fills.push(xml);
                        fills.len() - 1
                    }
                }
            }
        };
        let edges = (style.left, style.right, style.top, style.bottom);
        let border_id = match borders.iter().position(|known| *known == edges) {
            Some(index) => index,
            None => {
                borders.push(edges);
                borders.len() - 1
            }
        };
        let number_format = if style.date { 14 } else { 0 };
        xfs.push_str(&format!(
            r#"<xf numFmtId="{number_format}" fontId="0" fillId="{fill_id}" borderId="{border_id}" xfId="0"/>"#
        ));
    }
    let edge = |name: &str, visible: bool| {
        if visible {
            format!(r#"<{name} style="thin"><color indexed="64"/></{name}>"#)
        } else {
            format!("<{name}/>")
        }
    };
    let borders: String = borders
        .iter()
        .map(|(left, right, top, bottom)| format!(
            "<border>{}{}{}{}<diagonal/></border>",
            edge("left", *left),
            edge("right", *right),
            edge("top", *top),
            edge("bottom", *bottom)
        ))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="1"><numFmt numFmtId="164" formatCode="&quot;Godz.&quot; 0"/></numFmts><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="{}">{}</fills><borders count="{}">{}</borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="1" borderId="0"/></cellStyleXfs><cellXfs count="{}">{}</cellXfs><dxfs count="1"><dxf><fill><patternFill><bgColor rgb="FFFF0000"/></patternFill></fill></dxf></dxfs></styleSheet>"#,
        fills.len(),
        fills.concat(),
        styles.len().max(1),
        borders,
        styles.len(),
        xfs
    )
}

fn shared_strings_xml(strings: &[String]) -> String {
    let items: String = strings.iter().map(|text| format!("<si><t>{}</t></si>", escape(text))).collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">{1}</sst>"#,
        strings.len(),
        items
    )
}

pub fn column_name(mut col: usize) -> String {
    let mut name = String::new();
    while col > 0 {
        let remainder = (col - 1) % 26;
        name.insert(0, (b'A' + remainder as u8) as char);
        col = (col - 1) / 26;
    }
    name
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2><a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/></a:minorFont></a:fontScheme></a:themeElements></a:theme>"#;

/// Where a drawn day box ended up
#[derive(Copy, Clone, Debug)]
pub struct DayBox {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

/// Draws one day of the timetable template: a header row with slot numbers, the
/// date below it (four columns right of the group column) and one band per group.
pub fn draw_day(builder: &mut WorkbookBuilder, date: NaiveDate, top: usize, left: usize, groups: &[(&str, usize)]) -> DayBox {
    for slot in 1..=16 {
        builder.text(top, left + slot, &slot.to_string());
    }
    builder.date(top + 1, left + 4, date);
    builder.bottom_border(top + 1, left);
    let mut row = top + 2;
    for (name, height) in groups {
        builder.text(row, left, name);
        builder.bottom_border(row + height - 1, left);
        row += height;
    }
    let day = DayBox { top, left, bottom: row - 1, right: left + 16 };
    builder.outline(day.top, day.left, day.bottom, day.right);
    day
}

/// Draws a bordered class block: the name in the anchor, then one lecturer /
/// room pair per row below it (left and right column).
pub fn draw_block(
    builder: &mut WorkbookBuilder,
    (top, left): (usize, usize),
    (bottom, right): (usize, usize),
    name: &str,
    lines: &[(&str, &str)],
) {
    builder.text(top, left, name);
    for (offset, (lecturer, room)) in lines.iter().enumerate() {
        if !lecturer.is_empty() {
            builder.text(top + 1 + offset, left, lecturer);
        }
        if !room.is_empty() {
            builder.text(top + 1 + offset, right, room);
        }
    }
    builder.outline(top, left, bottom, right);
}
