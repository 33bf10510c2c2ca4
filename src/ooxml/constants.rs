//! Valores del formato OPC/OOXML: nombres reservados, espacios de nombres,
//! tipos de contenido y tipos de relación que usa la política.

pub const CONTENT_TYPES_ENTRY: &str = "[Content_Types].xml";
pub const ROOT_RELATIONSHIPS_ENTRY: &str = "_rels/.rels";
pub const RELATIONSHIPS_DIR: &str = "_rels";
pub const RELATIONSHIPS_EXTENSION: &str = "rels";

pub const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

pub const RELATIONSHIPS_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-package.relationships+xml";

/// Tipos de relación que se conservan sin inspección.
pub const ALLOWED_RELATIONS: [&str; 2] = [
    // Los hipervínculos se consideran seguros
    HYPERLINK_REL,
    "http://purl.oclc.org/ooxml/officeDocument/relationships/hyperlink",
];

/// Tipos de relación que siempre se eliminan.
pub const DENIED_RELATIONS: [&str; 18] = [
    // Macros
    VBA_PROJECT_REL,
    "http://schemas.microsoft.com/office/2006/relationships/vbaProjectSignature",
    "http://schemas.microsoft.com/office/2014/relationships/vbaProjectSignatureAgile",
    "http://schemas.microsoft.com/office/2020/07/relationships/vbaProjectSignatureV3",
    "http://schemas.microsoft.com/office/2006/relationships/wordVbaData",
    "http://schemas.microsoft.com/office/2006/relationships/keyMapCustomizations",
    "http://schemas.microsoft.com/office/2006/relationships/attachedToolbars",
    // Objetos OLE
    OLE_OBJECT_REL,
    "http://purl.oclc.org/ooxml/officeDocument/relationships/oleObject",
    "http://schemas.microsoft.com/office/2006/relationships/oleObject",
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/e1Object",
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/e2Object",
    // Controles ActiveX
    CONTROL_REL,
    "http://purl.oclc.org/ooxml/officeDocument/relationships/control",
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/activeXControl",
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/activeXControlBinary",
    "http://schemas.microsoft.com/office/2006/relationships/activeXControl",
    "http://schemas.microsoft.com/office/2006/relationships/activeXControlBinary",
];

pub const HYPERLINK_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
pub const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const IMAGE_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub const VBA_PROJECT_REL: &str = "http://schemas.microsoft.com/office/2006/relationships/vbaProject";
pub const OLE_OBJECT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/oleObject";
pub const CONTROL_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/control";
pub const ATTACHED_TEMPLATE_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/attachedTemplate";

// Tipos de contenido prohibidos
pub const VBA_DATA: &str = "application/vnd.ms-word.vbaData+xml";
pub const VBA_PROJECT: &str = "application/vnd.ms-office.vbaProject";
pub const VBA_PROJECT_SIGNATURE: &str = "application/vnd.ms-office.vbaProjectSignature";
pub const VBA_PROJECT_SIGNATURE_AGILE: &str = "application/vnd.ms-office.vbaProjectSignatureAgile";
pub const VBA_PROJECT_SIGNATURE_V3: &str = "application/vnd.ms-office.vbaProjectSignatureV3";
pub const POSTSCRIPT: &str = "application/postscript";
pub const OLE_OBJECT: &str = "application/vnd.openxmlformats-officedocument.oleObject";
pub const PACKAGE: &str = "application/vnd.openxmlformats-officedocument.package";
pub const ACTIVEX: &str = "application/vnd.ms-office.activeX";
pub const ACTIVEX_XML: &str = "application/vnd.ms-office.activeX+xml";
pub const OPENXML_ACTIVEX: &str = "application/vnd.openxmlformats-officedocument.activeX";
pub const OPENXML_ACTIVEX_XML: &str = "application/vnd.openxmlformats-officedocument.activeX+xml";
pub const EXCEL_MACRO_SHEET: &str = "application/vnd.ms-excel.macrosheet+xml";
pub const EXCEL_INTL_MACRO_SHEET: &str = "application/vnd.ms-excel.intlmacrosheet+xml";
pub const WORD_KEYMAP: &str = "application/vnd.ms-word.keyMapCustomizations+xml";
pub const WORD_ATTACHED_TOOLBARS: &str = "application/vnd.ms-word.attachedToolbars";

pub const FORBIDDEN_CONTENT_TYPES: [&str; 16] = [
    VBA_DATA,
    VBA_PROJECT,
    VBA_PROJECT_SIGNATURE,
    VBA_PROJECT_SIGNATURE_AGILE,
    VBA_PROJECT_SIGNATURE_V3,
    POSTSCRIPT,
    OLE_OBJECT,
    PACKAGE,
    ACTIVEX,
    ACTIVEX_XML,
    OPENXML_ACTIVEX,
    OPENXML_ACTIVEX_XML,
    EXCEL_MACRO_SHEET,
    EXCEL_INTL_MACRO_SHEET,
    WORD_KEYMAP,
    WORD_ATTACHED_TOOLBARS,
];

// Documentos principales con y sin macros
pub const MAIN_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
pub const MAIN_DOCM: &str = "application/vnd.ms-word.document.macroEnabled.main+xml";
pub const MAIN_DOTX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.template.main+xml";
pub const MAIN_DOTM: &str = "application/vnd.ms-word.template.macroEnabledTemplate.main+xml";
pub const MAIN_XLSX: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
pub const MAIN_XLSM: &str = "application/vnd.ms-excel.sheet.macroEnabled.main+xml";
pub const MAIN_XLTX: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.template.main+xml";
pub const MAIN_XLTM: &str = "application/vnd.ms-excel.template.macroEnabled.main+xml";
pub const MAIN_XLAM: &str = "application/vnd.ms-excel.addin.macroEnabled.main+xml";
pub const MAIN_PPTX: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
pub const MAIN_PPTM: &str = "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml";
pub const MAIN_PPSX: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideshow.main+xml";
pub const MAIN_PPSM: &str = "application/vnd.ms-powerpoint.slideshow.macroEnabled.main+xml";
pub const MAIN_POTX: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml";
pub const MAIN_POTM: &str = "application/vnd.ms-powerpoint.template.macroEnabled.main+xml";

pub const REMAPPED_CONTENT_TYPES: [(&str, &str); 8] = [
    // Word
    (MAIN_DOCM, MAIN_DOCX),
    (MAIN_DOTM, MAIN_DOTX),
    // Excel (los complementos no tienen equivalente sin macros: pasan a libro normal)
    (MAIN_XLSM, MAIN_XLSX),
    (MAIN_XLTM, MAIN_XLTX),
    (MAIN_XLAM, MAIN_XLSX),
    // PowerPoint
    (MAIN_PPTM, MAIN_PPTX),
    (MAIN_PPSM, MAIN_PPSX),
    (MAIN_POTM, MAIN_POTX),
];

/// Categorías de primer nivel aceptadas; cualquier otra se considera sospechosa.
pub const ALLOWED_TOP_LEVEL_TYPES: [&str; 4] = ["application", "image", "audio", "video"];
