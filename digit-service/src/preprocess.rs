//! 图片预处理：解码 -> 灰度 -> 缩放 -> 归一化到 [0, 1] -> `[1, H, W, 1]` 张量

use image::{imageops, GrayImage, Luma, RgbImage};
use ndarray::Array4;

use crate::config::PreprocessConfig;
use crate::error::ClassifyError;

/// 将上传的图片字节转换为模型输入张量（NHWC，单批次单通道）
pub fn to_input_tensor(bytes: &[u8], config: &PreprocessConfig) -> Result<Array4<f32>, ClassifyError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| ClassifyError::Decode(e.to_string()))?;

    let gray = luma_pil(&decoded.to_rgb8());
    let resized = imageops::resize(
        &gray,
        config.width,
        config.height,
        config.resize_filter.into(),
    );

    let (height, width) = (config.height as usize, config.width as usize);
    Ok(Array4::from_shape_fn((1, height, width, 1), |(_, y, x, _)| {
        f32::from(resized.get_pixel(x as u32, y as u32)[0]) / 255.0
    }))
}

/// ITU-R 601-2 亮度转换：L = R * 299/1000 + G * 587/1000 + B * 114/1000
///
/// 使用 16 位定点系数并四舍五入，与训练数据所用图片库的 "L" 模式转换结果逐像素一致。
pub fn luma_pil(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let l = (u32::from(r) * 19595 + u32::from(g) * 38470 + u32::from(b) * 7471 + 0x8000) >> 16;
        Luma([l as u8])
    })
}

/// 返回最大分数的下标；并列时取第一个，出现 NaN 时返回第一个 NaN 的下标
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            return Some(i);
        }
        match best {
            Some((_, current)) if score <= current => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_png(image: DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        buf
    }

    #[test]
    fn test_luma_coefficients() {
        let mut rgb = RgbImage::new(4, 1);
        rgb.put_pixel(0, 0, Rgb([255, 0, 0]));
        rgb.put_pixel(1, 0, Rgb([0, 255, 0]));
        rgb.put_pixel(2, 0, Rgb([0, 0, 255]));
        rgb.put_pixel(3, 0, Rgb([255, 255, 255]));

        let gray = luma_pil(&rgb);
        assert_eq!(gray.get_pixel(0, 0)[0], 76);
        assert_eq!(gray.get_pixel(1, 0)[0], 150);
        assert_eq!(gray.get_pixel(2, 0)[0], 29);
        assert_eq!(gray.get_pixel(3, 0)[0], 255);
    }

    #[test]
    fn test_tensor_shape_and_range() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(64, 48, |x, y| {
            Rgb([(x * 4) as u8, (y * 5) as u8, 128])
        }));
        let tensor = to_input_tensor(&encode_png(image), &PreprocessConfig::default()).unwrap();

        assert_eq!(tensor.shape(), &[1, 28, 28, 1]);
        assert!(tensor.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_solid_white_is_all_ones() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 100, Rgb([255, 255, 255])));
        let tensor = to_input_tensor(&encode_png(image), &PreprocessConfig::default()).unwrap();
        assert!(tensor.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_alpha_channel_is_ignored() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(28, 28, Rgba([0, 0, 0, 0])));
        let tensor = to_input_tensor(&encode_png(image), &PreprocessConfig::default()).unwrap();
        assert!(tensor.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_non_image_bytes_fail_to_decode() {
        let err = to_input_tensor(b"definitely not an image", &PreprocessConfig::default())
            .unwrap_err();
        assert!(matches!(err, ClassifyError::Decode(_)));
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5, 0.1]), Some(0));
        assert_eq!(argmax(&[-3.0, -1.0, -2.0]), Some(1));
        assert_eq!(argmax(&[0.1, f32::NAN, 0.9]), Some(1));
        assert_eq!(argmax(&[]), None);
    }
}
