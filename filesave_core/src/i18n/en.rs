pub(super) const MESSAGES: &[(u16, &str)] = &[
    (1000, "Received invalid file"),
    (1001, "Invalid file type. Only allowed: {{types}}"),
    (1002, "File too heavy. Max size is: {{maxSize}}"),
    (1003, "No files received"),
    (1004, "Multiple files are not allowed"),
    (1005, "Number of files exceeded, Maximum allowed: {{multiple}}"),
    (1006, "Invalid file size format: {{blobSize}}"),
    (1007, "Invalid file size unit: {{sizeUnit}}"),
    (1008, "Error uploading file"),
];
