//! Built-in tool table.

use super::{Category, ToolDefinition};

const JPEG: &[&str] = &[".jpg", ".jpeg"];
const TIFF: &[&str] = &[".tiff", ".tif"];
const HTML: &[&str] = &[".html", ".htm"];
const MARKDOWN: &[&str] = &[".md", ".markdown"];
const VIDEO: &[&str] = &[".mp4", ".mov", ".avi", ".mkv"];
const AUDIO: &[&str] = &[".mp3", ".wav", ".aac", ".ogg", ".flac"];
const AAC: &[&str] = &[".aac", ".m4a"];
const MEDIA: &[&str] = &[".mp4", ".avi", ".mkv", ".mp3", ".wav", ".flac"];
const OCR_IMAGES: &[&str] = &[".jpg", ".jpeg", ".png"];

const fn tool(
    slug: &'static str,
    label: &'static str,
    description: &'static str,
    source_extensions: &'static [&'static str],
    target_extension: &'static str,
    category: Category,
    converter: &'static str,
) -> ToolDefinition {
    ToolDefinition {
        slug,
        label,
        description,
        source_extensions,
        target_extension,
        category,
        converter,
    }
}

pub static BUILTIN_TOOLS: &[ToolDefinition] = &[
    tool(
        "jpg-to-png",
        "JPG → PNG",
        "Convert JPEG to lossless PNG format.",
        JPEG,
        ".png",
        Category::Images,
        "jpg_to_png",
    ),
    tool(
        "jpg-to-webp",
        "JPG → WEBP",
        "Convert JPEG to modern WEBP format with better compression.",
        JPEG,
        ".webp",
        Category::Images,
        "jpg_to_webp",
    ),
    tool(
        "jpg-to-tiff",
        "JPG → TIFF",
        "Convert JPEG to TIFF format for professional printing.",
        JPEG,
        ".tiff",
        Category::Images,
        "jpg_to_tiff",
    ),
    tool(
        "jpg-to-avif",
        "JPG → AVIF",
        "Convert JPEG to next-gen AVIF format.",
        JPEG,
        ".avif",
        Category::Images,
        "jpg_to_avif",
    ),
    tool(
        "png-to-jpg",
        "PNG → JPG",
        "Convert PNG to JPEG for smaller file sizes.",
        &[".png"],
        ".jpg",
        Category::Images,
        "png_to_jpg",
    ),
    tool(
        "png-to-webp",
        "PNG → WEBP",
        "Convert PNG to WEBP with excellent compression.",
        &[".png"],
        ".webp",
        Category::Images,
        "png_to_webp",
    ),
    tool(
        "png-to-tiff",
        "PNG → TIFF",
        "Convert PNG to TIFF format.",
        &[".png"],
        ".tiff",
        Category::Images,
        "png_to_tiff",
    ),
    tool(
        "png-to-avif",
        "PNG → AVIF",
        "Convert PNG to AVIF format.",
        &[".png"],
        ".avif",
        Category::Images,
        "png_to_avif",
    ),
    tool(
        "webp-to-png",
        "WEBP → PNG",
        "Convert WEBP to PNG format.",
        &[".webp"],
        ".png",
        Category::Images,
        "webp_to_png",
    ),
    tool(
        "webp-to-jpg",
        "WEBP → JPG",
        "Convert WEBP to JPEG format.",
        &[".webp"],
        ".jpg",
        Category::Images,
        "webp_to_jpg",
    ),
    tool(
        "webp-to-tiff",
        "WEBP → TIFF",
        "Convert WEBP to TIFF format.",
        &[".webp"],
        ".tiff",
        Category::Images,
        "webp_to_tiff",
    ),
    tool(
        "tiff-to-png",
        "TIFF → PNG",
        "Convert TIFF to PNG format.",
        TIFF,
        ".png",
        Category::Images,
        "tiff_to_png",
    ),
    tool(
        "tiff-to-jpg",
        "TIFF → JPG",
        "Convert TIFF to JPEG format.",
        TIFF,
        ".jpg",
        Category::Images,
        "tiff_to_jpg",
    ),
    tool(
        "tiff-to-webp",
        "TIFF → WEBP",
        "Convert TIFF to WEBP format.",
        TIFF,
        ".webp",
        Category::Images,
        "tiff_to_webp",
    ),
    tool(
        "avif-to-png",
        "AVIF → PNG",
        "Convert AVIF to PNG format.",
        &[".avif"],
        ".png",
        Category::Images,
        "avif_to_png",
    ),
    tool(
        "avif-to-jpg",
        "AVIF → JPG",
        "Convert AVIF to JPEG format.",
        &[".avif"],
        ".jpg",
        Category::Images,
        "avif_to_jpg",
    ),
    tool(
        "avif-to-webp",
        "AVIF → WEBP",
        "Convert AVIF to WEBP format.",
        &[".avif"],
        ".webp",
        Category::Images,
        "avif_to_webp",
    ),

    tool(
        "docx-to-txt",
        "DOCX → TXT",
        "Extract text from Word documents.",
        &[".docx"],
        ".txt",
        Category::Documents,
        "docx_to_txt",
    ),
    tool(
        "docx-to-html",
        "DOCX → HTML",
        "Convert Word documents to HTML.",
        &[".docx"],
        ".html",
        Category::Documents,
        "docx_to_html",
    ),
    tool(
        "docx-to-pdf",
        "DOCX → PDF",
        "Convert Word documents to PDF format.",
        &[".docx"],
        ".pdf",
        Category::Documents,
        "docx_to_pdf",
    ),
    tool(
        "txt-to-pdf",
        "TXT → PDF",
        "Convert text files to PDF documents.",
        &[".txt"],
        ".pdf",
        Category::Documents,
        "txt_to_pdf",
    ),
    tool(
        "pdf-to-txt",
        "PDF → TXT",
        "Extract full text content from PDF files with metadata.",
        &[".pdf"],
        ".txt",
        Category::Documents,
        "pdf_to_txt",
    ),
    tool(
        "html-to-txt",
        "HTML → TXT",
        "Extract text from HTML files.",
        HTML,
        ".txt",
        Category::Documents,
        "html_to_txt",
    ),
    tool(
        "md-to-html",
        "MD → HTML",
        "Convert Markdown to HTML.",
        MARKDOWN,
        ".html",
        Category::Documents,
        "md_to_html",
    ),
    tool(
        "md-to-txt",
        "MD → TXT",
        "Convert Markdown to plain text.",
        MARKDOWN,
        ".txt",
        Category::Documents,
        "md_to_txt",
    ),
    tool(
        "docx-to-odt",
        "DOCX → ODT",
        "Convert Microsoft Word to OpenDocument Text format.",
        &[".docx"],
        ".odt",
        Category::Documents,
        "docx_to_odt",
    ),
    tool(
        "docx-to-rtf",
        "DOCX → RTF",
        "Convert Word document to Rich Text Format.",
        &[".docx"],
        ".rtf",
        Category::Documents,
        "docx_to_rtf",
    ),
    tool(
        "odt-to-docx",
        "ODT → DOCX",
        "Convert OpenDocument to Microsoft Word format.",
        &[".odt"],
        ".docx",
        Category::Documents,
        "odt_to_docx",
    ),
    tool(
        "rtf-to-docx",
        "RTF → DOCX",
        "Convert Rich Text Format to Word document.",
        &[".rtf"],
        ".docx",
        Category::Documents,
        "rtf_to_docx",
    ),
    tool(
        "pdf-to-docx",
        "PDF → DOCX",
        "Convert PDF to editable Word document.",
        &[".pdf"],
        ".docx",
        Category::Documents,
        "pdf_to_docx",
    ),
    tool(
        "pdf-to-rtf",
        "PDF → RTF",
        "Convert PDF to Rich Text Format.",
        &[".pdf"],
        ".rtf",
        Category::Documents,
        "pdf_to_rtf",
    ),
    tool(
        "images-to-pdf",
        "Image → PDF",
        "Convert image to PDF document (JPG, PNG).",
        OCR_IMAGES,
        ".pdf",
        Category::Documents,
        "images_to_pdf",
    ),
    tool(
        "md-to-docx",
        "MD → DOCX",
        "Convert Markdown to Word document.",
        MARKDOWN,
        ".docx",
        Category::Documents,
        "md_to_docx",
    ),
    tool(
        "md-to-rtf",
        "MD → RTF",
        "Convert Markdown to Rich Text Format.",
        MARKDOWN,
        ".rtf",
        Category::Documents,
        "md_to_rtf",
    ),
    tool(
        "html-to-docx",
        "HTML → DOCX",
        "Convert HTML to Word document.",
        HTML,
        ".docx",
        Category::Documents,
        "html_to_docx",
    ),
    tool(
        "html-to-rtf",
        "HTML → RTF",
        "Convert HTML to Rich Text Format.",
        HTML,
        ".rtf",
        Category::Documents,
        "html_to_rtf",
    ),

    tool(
        "image-to-searchable-pdf",
        "Image → Searchable PDF (OCR)",
        "OCR image and create searchable PDF with text layer using Tesseract.",
        OCR_IMAGES,
        ".pdf",
        Category::Ocr,
        "image_to_searchable_pdf",
    ),
    tool(
        "image-to-text-ocr",
        "Image → Text (OCR)",
        "Extract text from image using OCR (Tesseract).",
        OCR_IMAGES,
        ".txt",
        Category::Ocr,
        "image_to_text_ocr",
    ),

    tool(
        "pdf-to-json",
        "PDF → JSON",
        "Extract PDF metadata and structure to JSON.",
        &[".pdf"],
        ".json",
        Category::Documents,
        "pdf_to_json",
    ),
    tool(
        "pdf-optimize",
        "Optimize PDF",
        "Compress and optimize PDF file size.",
        &[".pdf"],
        ".pdf",
        Category::Documents,
        "pdf_optimize",
    ),
    tool(
        "html-to-pdf",
        "HTML → PDF",
        "Convert HTML documents to PDF.",
        HTML,
        ".pdf",
        Category::Documents,
        "html_to_pdf",
    ),
    tool(
        "image-to-pdf",
        "Image → PDF",
        "Convert images (JPG, PNG, WEBP) to PDF.",
        &[".jpg", ".jpeg", ".png", ".webp"],
        ".pdf",
        Category::Documents,
        "image_to_pdf",
    ),
    tool(
        "pdf-info",
        "PDF Info",
        "Extract detailed PDF metadata and information.",
        &[".pdf"],
        ".json",
        Category::Documents,
        "pdf_info",
    ),
    tool(
        "pdf-to-html",
        "PDF → HTML",
        "Convert PDF to beautifully formatted HTML with full text extraction.",
        &[".pdf"],
        ".html",
        Category::Documents,
        "pdf_to_html",
    ),
    tool(
        "pdf-split",
        "Split PDF",
        "Split PDF into individual page files.",
        &[".pdf"],
        ".pdf",
        Category::Documents,
        "pdf_split",
    ),

    tool(
        "txt-to-pptx",
        "TXT → PPTX",
        "Convert text file to PowerPoint presentation.",
        &[".txt"],
        ".pptx",
        Category::Presentations,
        "txt_to_pptx",
    ),
    tool(
        "json-to-pptx",
        "JSON → PPTX",
        "Convert JSON data to PowerPoint slides.",
        &[".json"],
        ".pptx",
        Category::Presentations,
        "json_to_pptx",
    ),
    tool(
        "csv-to-pptx",
        "CSV → PPTX",
        "Convert CSV data to PowerPoint presentation.",
        &[".csv"],
        ".pptx",
        Category::Presentations,
        "csv_to_pptx",
    ),
    tool(
        "md-to-pptx",
        "MD → PPTX",
        "Convert Markdown to PowerPoint presentation.",
        MARKDOWN,
        ".pptx",
        Category::Presentations,
        "md_to_pptx",
    ),

    tool(
        "mp4-to-mov",
        "MP4 → MOV",
        "Convert MP4 to MOV (QuickTime) format.",
        &[".mp4"],
        ".mov",
        Category::Videos,
        "mp4_to_mov",
    ),
    tool(
        "mp4-to-avi",
        "MP4 → AVI",
        "Convert MP4 to AVI format.",
        &[".mp4"],
        ".avi",
        Category::Videos,
        "mp4_to_avi",
    ),
    tool(
        "mp4-to-mkv",
        "MP4 → MKV",
        "Convert MP4 to MKV (Matroska) format.",
        &[".mp4"],
        ".mkv",
        Category::Videos,
        "mp4_to_mkv",
    ),
    tool(
        "mp4-to-webm",
        "MP4 → WebM",
        "Convert MP4 to WebM for web optimization.",
        &[".mp4"],
        ".webm",
        Category::Videos,
        "mp4_to_webm",
    ),
    tool(
        "mov-to-mp4",
        "MOV → MP4",
        "Convert MOV to MP4 format.",
        &[".mov"],
        ".mp4",
        Category::Videos,
        "mov_to_mp4",
    ),
    tool(
        "mov-to-mkv",
        "MOV → MKV",
        "Convert MOV to MKV format.",
        &[".mov"],
        ".mkv",
        Category::Videos,
        "mov_to_mkv",
    ),
    tool(
        "avi-to-mp4",
        "AVI → MP4",
        "Convert AVI to MP4 format.",
        &[".avi"],
        ".mp4",
        Category::Videos,
        "avi_to_mp4",
    ),
    tool(
        "mkv-to-mp4",
        "MKV → MP4",
        "Convert MKV to MP4 format.",
        &[".mkv"],
        ".mp4",
        Category::Videos,
        "mkv_to_mp4",
    ),
    tool(
        "video-to-gif",
        "Video → GIF",
        "Convert short video clips to GIF (first 5 seconds).",
        VIDEO,
        ".gif",
        Category::Videos,
        "video_to_gif",
    ),
    tool(
        "video-to-mp3",
        "Video → MP3",
        "Extract audio from video as MP3.",
        VIDEO,
        ".mp3",
        Category::Videos,
        "video_to_mp3",
    ),
    tool(
        "video-to-wav",
        "Video → WAV",
        "Extract audio from video as WAV.",
        VIDEO,
        ".wav",
        Category::Videos,
        "video_to_wav",
    ),
    tool(
        "video-to-aac",
        "Video → AAC",
        "Extract audio from video as AAC.",
        VIDEO,
        ".aac",
        Category::Videos,
        "video_to_aac",
    ),
    tool(
        "video-to-ogg",
        "Video → OGG",
        "Extract audio from video as OGG.",
        VIDEO,
        ".ogg",
        Category::Videos,
        "video_to_ogg",
    ),
    tool(
        "video-to-1080p",
        "Video → 1080p",
        "Convert video to 1080p (Full HD) resolution.",
        VIDEO,
        ".mp4",
        Category::Videos,
        "video_to_1080p",
    ),
    tool(
        "video-to-720p",
        "Video → 720p",
        "Convert video to 720p (HD) resolution.",
        VIDEO,
        ".mp4",
        Category::Videos,
        "video_to_720p",
    ),
    tool(
        "video-to-480p",
        "Video → 480p",
        "Convert video to 480p (SD) resolution.",
        VIDEO,
        ".mp4",
        Category::Videos,
        "video_to_480p",
    ),
    tool(
        "video-to-30fps",
        "Video → 30fps",
        "Convert video to 30 frames per second.",
        VIDEO,
        ".mp4",
        Category::Videos,
        "video_to_30fps",
    ),
    tool(
        "video-to-24fps",
        "Video → 24fps",
        "Convert video to 24 frames per second (cinematic).",
        VIDEO,
        ".mp4",
        Category::Videos,
        "video_to_24fps",
    ),
    tool(
        "video-to-60fps",
        "Video → 60fps",
        "Convert video to 60 frames per second (smooth).",
        VIDEO,
        ".mp4",
        Category::Videos,
        "video_to_60fps",
    ),
    tool(
        "optimize-video",
        "Optimize Video",
        "Optimize video for web (720p, reduced bitrate, fast start).",
        VIDEO,
        ".mp4",
        Category::Videos,
        "optimize_video",
    ),

    tool(
        "mp3-to-wav",
        "MP3 → WAV",
        "Convert MP3 to uncompressed WAV format.",
        &[".mp3"],
        ".wav",
        Category::Audio,
        "mp3_to_wav",
    ),
    tool(
        "mp3-to-aac",
        "MP3 → AAC",
        "Convert MP3 to AAC format.",
        &[".mp3"],
        ".aac",
        Category::Audio,
        "mp3_to_aac",
    ),
    tool(
        "mp3-to-ogg",
        "MP3 → OGG",
        "Convert MP3 to OGG Vorbis format.",
        &[".mp3"],
        ".ogg",
        Category::Audio,
        "mp3_to_ogg",
    ),
    tool(
        "mp3-to-flac",
        "MP3 → FLAC",
        "Convert MP3 to lossless FLAC format.",
        &[".mp3"],
        ".flac",
        Category::Audio,
        "mp3_to_flac",
    ),
    tool(
        "wav-to-mp3",
        "WAV → MP3",
        "Convert WAV to compressed MP3 format.",
        &[".wav"],
        ".mp3",
        Category::Audio,
        "wav_to_mp3",
    ),
    tool(
        "wav-to-aac",
        "WAV → AAC",
        "Convert WAV to AAC format.",
        &[".wav"],
        ".aac",
        Category::Audio,
        "wav_to_aac",
    ),
    tool(
        "wav-to-ogg",
        "WAV → OGG",
        "Convert WAV to OGG Vorbis format.",
        &[".wav"],
        ".ogg",
        Category::Audio,
        "wav_to_ogg",
    ),
    tool(
        "wav-to-flac",
        "WAV → FLAC",
        "Convert WAV to lossless FLAC format.",
        &[".wav"],
        ".flac",
        Category::Audio,
        "wav_to_flac",
    ),
    tool(
        "aac-to-mp3",
        "AAC → MP3",
        "Convert AAC to MP3 format.",
        AAC,
        ".mp3",
        Category::Audio,
        "aac_to_mp3",
    ),
    tool(
        "aac-to-wav",
        "AAC → WAV",
        "Convert AAC to uncompressed WAV format.",
        AAC,
        ".wav",
        Category::Audio,
        "aac_to_wav",
    ),
    tool(
        "aac-to-ogg",
        "AAC → OGG",
        "Convert AAC to OGG Vorbis format.",
        AAC,
        ".ogg",
        Category::Audio,
        "aac_to_ogg",
    ),
    tool(
        "aac-to-flac",
        "AAC → FLAC",
        "Convert AAC to lossless FLAC format.",
        AAC,
        ".flac",
        Category::Audio,
        "aac_to_flac",
    ),
    tool(
        "ogg-to-mp3",
        "OGG → MP3",
        "Convert OGG to MP3 format.",
        &[".ogg"],
        ".mp3",
        Category::Audio,
        "ogg_to_mp3",
    ),
    tool(
        "ogg-to-wav",
        "OGG → WAV",
        "Convert OGG to uncompressed WAV format.",
        &[".ogg"],
        ".wav",
        Category::Audio,
        "ogg_to_wav",
    ),
    tool(
        "ogg-to-aac",
        "OGG → AAC",
        "Convert OGG to AAC format.",
        &[".ogg"],
        ".aac",
        Category::Audio,
        "ogg_to_aac",
    ),
    tool(
        "ogg-to-flac",
        "OGG → FLAC",
        "Convert OGG to lossless FLAC format.",
        &[".ogg"],
        ".flac",
        Category::Audio,
        "ogg_to_flac",
    ),
    tool(
        "flac-to-mp3",
        "FLAC → MP3",
        "Convert FLAC to compressed MP3 format.",
        &[".flac"],
        ".mp3",
        Category::Audio,
        "flac_to_mp3",
    ),
    tool(
        "flac-to-wav",
        "FLAC → WAV",
        "Convert FLAC to uncompressed WAV format.",
        &[".flac"],
        ".wav",
        Category::Audio,
        "flac_to_wav",
    ),
    tool(
        "flac-to-aac",
        "FLAC → AAC",
        "Convert FLAC to AAC format.",
        &[".flac"],
        ".aac",
        Category::Audio,
        "flac_to_aac",
    ),
    tool(
        "flac-to-ogg",
        "FLAC → OGG",
        "Convert FLAC to OGG Vorbis format.",
        &[".flac"],
        ".ogg",
        Category::Audio,
        "flac_to_ogg",
    ),
    tool(
        "audio-to-128k",
        "Audio → 128kbps",
        "Reduce audio bitrate to 128kbps for smaller file size.",
        AUDIO,
        ".mp3",
        Category::Audio,
        "audio_to_128k",
    ),
    tool(
        "audio-to-192k",
        "Audio → 192kbps",
        "Convert audio to 192kbps (good quality).",
        AUDIO,
        ".mp3",
        Category::Audio,
        "audio_to_192k",
    ),
    tool(
        "audio-to-320k",
        "Audio → 320kbps",
        "Convert audio to 320kbps (high quality).",
        AUDIO,
        ".mp3",
        Category::Audio,
        "audio_to_320k",
    ),
    tool(
        "audio-to-mono",
        "Audio → Mono",
        "Convert stereo audio to mono (single channel).",
        AUDIO,
        ".mp3",
        Category::Audio,
        "audio_to_mono",
    ),
    tool(
        "audio-to-stereo",
        "Audio → Stereo",
        "Convert mono audio to stereo (dual channel).",
        AUDIO,
        ".mp3",
        Category::Audio,
        "audio_to_stereo",
    ),
    tool(
        "audio-to-44100hz",
        "Audio → 44.1kHz",
        "Convert audio sample rate to 44.1kHz (CD quality).",
        AUDIO,
        ".mp3",
        Category::Audio,
        "audio_to_44100_hz",
    ),
    tool(
        "audio-to-48000hz",
        "Audio → 48kHz",
        "Convert audio sample rate to 48kHz (professional).",
        AUDIO,
        ".mp3",
        Category::Audio,
        "audio_to_48000_hz",
    ),
    tool(
        "audio-to-96000hz",
        "Audio → 96kHz",
        "Convert audio sample rate to 96kHz (high-res).",
        AUDIO,
        ".flac",
        Category::Audio,
        "audio_to_96000_hz",
    ),
    tool(
        "optimize-audio",
        "Optimize Audio",
        "Optimize audio for web (128kbps MP3, 44.1kHz).",
        AUDIO,
        ".mp3",
        Category::Audio,
        "optimize_audio",
    ),
    tool(
        "audio-to-web-aac",
        "Audio → Web AAC",
        "Optimize audio for web as AAC (iOS compatible).",
        AUDIO,
        ".aac",
        Category::Audio,
        "audio_to_web_aac",
    ),

    tool(
        "media-info",
        "Media Info",
        "Extract metadata from video/audio files.",
        MEDIA,
        ".json",
        Category::Videos,
        "media_info",
    ),
    tool(
        "media-to-txt",
        "Media → TXT",
        "Extract media metadata to text format.",
        MEDIA,
        ".txt",
        Category::Videos,
        "media_to_txt",
    ),

    tool(
        "xlsx-to-csv",
        "XLSX → CSV",
        "Convert Excel to CSV format.",
        &[".xlsx"],
        ".csv",
        Category::Spreadsheets,
        "xlsx_to_csv",
    ),
    tool(
        "xlsx-to-txt",
        "XLSX → TXT",
        "Convert Excel to plain text.",
        &[".xlsx"],
        ".txt",
        Category::Spreadsheets,
        "xlsx_to_txt",
    ),
    tool(
        "xlsx-to-html",
        "XLSX → HTML",
        "Convert Excel to HTML table.",
        &[".xlsx"],
        ".html",
        Category::Spreadsheets,
        "xlsx_to_html",
    ),
    tool(
        "xlsx-to-json",
        "XLSX → JSON",
        "Convert Excel to JSON format.",
        &[".xlsx"],
        ".json",
        Category::Spreadsheets,
        "xlsx_to_json",
    ),
    tool(
        "csv-to-xlsx",
        "CSV → XLSX",
        "Convert CSV to Excel format.",
        &[".csv"],
        ".xlsx",
        Category::Spreadsheets,
        "csv_to_xlsx",
    ),
    tool(
        "csv-to-json",
        "CSV → JSON",
        "Convert CSV to JSON format.",
        &[".csv"],
        ".json",
        Category::Spreadsheets,
        "csv_to_json",
    ),
    tool(
        "csv-to-html",
        "CSV → HTML",
        "Convert CSV to HTML table.",
        &[".csv"],
        ".html",
        Category::Spreadsheets,
        "csv_to_html",
    ),
    tool(
        "json-to-xlsx",
        "JSON → XLSX",
        "Convert JSON to Excel format.",
        &[".json"],
        ".xlsx",
        Category::Spreadsheets,
        "json_to_xlsx",
    ),
    tool(
        "json-to-csv",
        "JSON → CSV",
        "Convert JSON to CSV format.",
        &[".json"],
        ".csv",
        Category::Spreadsheets,
        "json_to_csv",
    ),

    tool(
        "file-to-zip",
        "File → ZIP",
        "Create a ZIP archive from any file.",
        &[".txt", ".pdf", ".jpg", ".png", ".docx", ".xlsx"],
        ".zip",
        Category::Archives,
        "file_to_zip",
    ),
    tool(
        "zip-to-txt",
        "ZIP → TXT",
        "List ZIP archive contents.",
        &[".zip"],
        ".txt",
        Category::Archives,
        "zip_to_txt",
    ),
];
